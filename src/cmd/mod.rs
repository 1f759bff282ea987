//! CLI command implementations.
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `run`    | `Run`            |
//! | `phase`  | `Phases`         |
//! | `config` | `Config`         |

pub mod config;
pub mod phase;
pub mod run;

pub use config::cmd_config;
pub use phase::cmd_phases;
pub use run::cmd_run;
