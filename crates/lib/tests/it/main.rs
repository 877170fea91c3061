/*! Integration tests for Kindred.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Tests for the ContentBackend trait and its implementations
 * - reorder: Tests for optimistic reordering against real and failing backends
 * - cms: Tests for in-place editing and cache invalidation
 * - site: Tests for the Site facade (pages, uploads, cascading deletes)
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("kindred=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod helpers;
mod reorder;
