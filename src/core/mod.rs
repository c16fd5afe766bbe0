//! Portal protocol: login, chart retrieval, batch scheduling and the dashboard.

pub mod dashboard;
pub mod html;
pub mod http;
pub mod logging;
pub mod models;
pub mod portal;
pub mod protocol;
pub mod scheduler;
pub mod session;

pub use dashboard::{DashboardReader, DashboardReading, DashboardSnapshot};
pub use models::{CurrentPayload, HistoryPayload, RobotOutput};
pub use portal::PortalEndpoints;
pub use protocol::{ChartQuery, ChartSequence, PortalProtocolDriver, ProtocolStep, RawChartData};
pub use scheduler::{
    BatchOutcome, BatchRetrievalScheduler, DEFAULT_RENEWAL_THRESHOLD, DayArtifact, DayFailure,
    RenewalPolicy, RetrievalJob,
};
pub use session::{AuthSession, Credentials, Session};
