//! Background revocation of expired leases.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::lease_ledger::LeaseLedger;

pub fn spawn_lease_sweeper(ledger: LeaseLedger, interval: Duration) {
    tokio::spawn(async move {
        info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "lease sweeper started"
        );

        loop {
            match ledger.sweep(Utc::now()).await {
                Ok(outcome) if outcome.revoked > 0 || outcome.failed > 0 => {
                    info!(
                        revoked = outcome.revoked,
                        failed = outcome.failed,
                        "lease sweep finished"
                    );
                }
                Ok(_) => {}
                Err(error) => error!(error = %error, "lease sweep failed"),
            }

            tokio::time::sleep(interval).await;
        }
    });
}
