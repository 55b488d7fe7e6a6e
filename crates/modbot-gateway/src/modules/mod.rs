//! Per-feature command modules

mod awards;
mod enforcement;
mod lostmembers;
mod modlogs;
mod reports;
mod staff;

pub use awards::AwardsModule;
pub use enforcement::EnforcementModule;
pub use lostmembers::LostMembersModule;
pub use modlogs::ModLogsModule;
pub use reports::ReportsModule;
pub use staff::StaffModule;

use crate::dispatch::Module;

/// Every built-in module in routing order
pub fn default_modules() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(StaffModule),
        Box::new(EnforcementModule),
        Box::new(AwardsModule),
        Box::new(ModLogsModule),
        Box::new(ReportsModule),
        Box::new(LostMembersModule),
    ]
}
