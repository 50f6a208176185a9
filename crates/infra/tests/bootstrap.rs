//! Process-wide setup from the environment. Kept in its own test binary since it
//! installs the global subscriber and mutates environment variables.

use stockkeep_infra::config::{ENV_CONFLICT_RETRIES, ENV_LOG};
use stockkeep_infra::store::InMemoryStore;
use stockkeep_infra::Services;
use tracing::Level;

#[test]
fn from_env_applies_retry_count_and_log_filter() {
    // SAFETY: the only test in this binary; no other thread reads the environment.
    unsafe {
        std::env::remove_var("RUST_LOG");
        std::env::set_var(ENV_CONFLICT_RETRIES, "4");
        std::env::set_var(ENV_LOG, "warn");
    }

    let services = Services::from_env(InMemoryStore::new()).unwrap();
    assert_eq!(services.config.conflict_retries, 4);
    assert_eq!(services.config.log_filter, "warn");

    assert!(tracing::dispatcher::has_been_set());
    assert!(tracing::enabled!(Level::WARN));
    assert!(!tracing::enabled!(Level::INFO));

    // Services built this way are usable straight away.
    let category = services.catalog.create_category("General", "").unwrap();
    assert_eq!(services.catalog.list_categories().unwrap(), vec![category]);
}
