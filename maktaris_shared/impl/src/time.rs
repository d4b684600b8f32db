use chrono::{DateTime, Utc};
use maktaris_di::Build;
use maktaris_shared_contracts::time::TimeService;
use maktaris_utils::trace_instrument;

#[derive(Debug, Clone, Copy, Build)]
pub struct TimeServiceImpl;

impl TimeService for TimeServiceImpl {
    #[trace_instrument(skip(self))]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
