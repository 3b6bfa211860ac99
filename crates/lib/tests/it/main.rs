/*! Integration tests for Formwork.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - schema: Tests for form construction and the tagged-wrapper JSON shape
 * - controller: Tests for occurrence controllers (cardinality, indices)
 * - layer: Tests for the recursive composition layer
 * - option_set: Tests for selection topologies, stash/restore, and cleanup
 * - form: Tests for the facade (validation propagation, events, ordering)
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("formwork=debug".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod controller;
mod form;
mod helpers;
mod layer;
mod option_set;
mod schema;
