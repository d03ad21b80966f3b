use pms_alerts::AlertError;
use pms_clock::ClockError;
use pms_ledger::LedgerError;
use pms_registry::RegistryError;
use pms_requests::RequestError;
use pms_tariff::TariffError;

/// 值班服务错误。
#[derive(Debug, thiserror::Error)]
pub enum OccupancyError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Tariff(#[from] TariffError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("lock failed")]
    Lock,
}
