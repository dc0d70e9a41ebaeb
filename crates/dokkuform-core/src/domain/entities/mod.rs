pub mod app;
pub mod command;
pub mod plan;
pub mod record;

pub use app::DokkuApp;
pub use command::DokkuCommand;
pub use plan::{Plan, PlanAction};
pub use record::AppRecord;
