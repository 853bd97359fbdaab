//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error                                    |
//! | 2    | Usage error (bad args, unknown preset)           |
//! | 3    | IO error (missing file, unreadable archive)      |
//! | 4    | Parse error (config, catalog)                    |
//! | 5    | Ingestion reported row errors (`--strict` only)  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown preset name.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read, or an archive could not be decoded.
pub const EXIT_IO: u8 = 3;

/// Config or catalog could not be parsed or failed validation.
pub const EXIT_PARSE: u8 = 4;

/// `ingest --strict` saw at least one rejected row.
pub const EXIT_INGEST_REJECTED: u8 = 5;
