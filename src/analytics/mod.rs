//! Equity and absence analytics over validated records.

mod absence;
mod equity;

pub use absence::{
    AbsenceReport, AbsenceStats, AreaAbsence, HighAbsenceEmployee, UNASSIGNED_AREA,
    absence_report,
};
pub use equity::{EquityReport, GenderGap, LevelEquity, equity_report};
