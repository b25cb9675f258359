//! Data Ingestion Abilities
//!
//! A small set of callable abilities that let an autonomous agent pull
//! tabular data from heterogeneous sources into one normalized in-memory
//! representation:
//! - Spreadsheet ingestion (xls/xlsx/xlsb/ods via calamine)
//! - Relational queries (one scoped connection per invocation)
//! - A shared Ability contract with fail-fast request validation
//!
//! Both abilities converge on a single [`TabularValue`] shape regardless of
//! source. Registration and dispatch by name belong to the surrounding
//! agent process; this crate only provides conforming implementations and
//! a catalog to collect them in.

pub mod abilities;
pub mod error;
pub mod table;

// Re-exports for convenience
pub use abilities::{
    Ability, AbilityCatalog, AbilityDescriptor, ConnectionParams, InvocationRequest,
    ParameterSpec, ParameterType, PgBackend, RelationalQueryAbility, SpreadsheetIngestAbility,
    SqlBackend, SqlSession,
};
pub use error::{AbilityError, AbilityResult};
pub use table::{CellValue, TabularValue};
