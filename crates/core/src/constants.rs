//! Constants used throughout the contacts core crate.
//!
//! Storage keys, file names and pagination limits live here so the CLI, the REST layer and
//! the core agree on them.

/// Namespace under which the filter selection is persisted.
pub const FILTERS_STORAGE_KEY: &str = "contact-ia-filters";

/// Version written into the persisted filter envelope.
pub const FILTERS_STORAGE_VERSION: u32 = 0;

/// First page of any paginated view.
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when nothing else is configured.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Largest page size accepted from external callers.
pub const MAX_PER_PAGE: usize = 100;

/// Default directory holding the JSON data files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default directory for persisted UI state.
pub const DEFAULT_STATE_DIR: &str = ".contacts";

/// Filename of the record collection inside the data directory.
pub const RECORDS_FILENAME: &str = "records.json";

/// Filename of the option catalog inside the data directory.
pub const FILTER_OPTIONS_FILENAME: &str = "filter_options.json";

/// Placeholder rendered (and grouped under) for missing values.
pub const EMPTY_PLACEHOLDER: &str = "—";
