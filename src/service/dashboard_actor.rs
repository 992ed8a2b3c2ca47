use crate::error::HubError;
use crate::service::analytics::AnalyticsService;
use crate::service::auth::AuthService;
use crate::service::inventory::InventoryService;
use crate::service::notifications::NotificationService;
use crate::types::dashboard::DashboardStats;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Public messages handled by the dashboard actor.
#[derive(Debug)]
pub enum DashboardMessage {
    /// Recompute the cached stats, run the low-stock scan and prune expired sessions.
    Refresh,
    /// Cached stats, computed on demand if nothing is cached yet.
    GetStats(RpcReplyPort<Option<DashboardStats>>),
    /// Drop the cache so the next read recomputes (after writes).
    Invalidate,
}

/// Handle for interacting with the dashboard actor.
#[derive(Clone)]
pub struct DashboardHandle {
    actor: ActorRef<DashboardMessage>,
}

impl DashboardHandle {
    pub async fn get_stats(&self) -> Result<DashboardStats, HubError> {
        ractor::call!(self.actor, DashboardMessage::GetStats)
            .map_err(|e| HubError::Actor(format!("GetStats RPC failed: {e}")))?
            .ok_or_else(|| HubError::Unavailable("dashboard stats are not available".into()))
    }

    pub fn refresh(&self) {
        let _ = ractor::cast!(self.actor, DashboardMessage::Refresh);
    }

    pub fn invalidate(&self) {
        let _ = ractor::cast!(self.actor, DashboardMessage::Invalidate);
    }
}

pub struct DashboardArgs {
    pub analytics: AnalyticsService,
    pub auth: AuthService,
    pub inventory: InventoryService,
    pub notifications: NotificationService,
    pub refresh_interval: Duration,
}

struct DashboardState {
    analytics: AnalyticsService,
    auth: AuthService,
    inventory: InventoryService,
    notifications: NotificationService,
    cached: Option<DashboardStats>,
    ticker: Option<JoinHandle<()>>,
}

struct DashboardActor;

#[ractor::async_trait]
impl Actor for DashboardActor {
    type Msg = DashboardMessage;
    type State = DashboardState;
    type Arguments = DashboardArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let ticker = myself.send_interval(args.refresh_interval, || DashboardMessage::Refresh);
        info!(
            refresh_secs = args.refresh_interval.as_secs(),
            "DashboardActor started"
        );
        Ok(DashboardState {
            analytics: args.analytics,
            auth: args.auth,
            inventory: args.inventory,
            notifications: args.notifications,
            cached: None,
            ticker: Some(ticker),
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DashboardMessage::Refresh => {
                match state.notifications.scan_low_stock(&state.inventory).await {
                    Ok(0) => {}
                    Ok(raised) => info!(raised, "low-stock scan raised notifications"),
                    Err(e) => warn!(error = %e, "low-stock scan failed"),
                }
                if let Err(e) = state.auth.prune_expired_sessions().await {
                    warn!(error = %e, "session pruning failed");
                }
                self.recompute(state).await;
            }
            DashboardMessage::GetStats(rp) => {
                if state.cached.is_none() {
                    self.recompute(state).await;
                }
                let _ = rp.send(state.cached.clone());
            }
            DashboardMessage::Invalidate => {
                state.cached = None;
            }
        }
        Ok(())
    }
}

impl DashboardActor {
    /// Keeps the previous snapshot when the store is unreachable.
    async fn recompute(&self, state: &mut DashboardState) {
        match state.analytics.dashboard().await {
            Ok(stats) => {
                debug!(
                    total_sales = stats.total_sales,
                    low_stock = stats.low_stock_count,
                    "dashboard stats refreshed"
                );
                state.cached = Some(stats);
            }
            Err(e) => warn!(error = %e, "dashboard refresh failed; keeping previous stats"),
        }
    }
}

/// Spawn the dashboard actor and return a handle.
pub async fn spawn(args: DashboardArgs) -> Result<DashboardHandle, HubError> {
    let (actor, _jh) = Actor::spawn(None, DashboardActor, args)
        .await
        .map_err(|e| HubError::Actor(format!("failed to spawn DashboardActor: {e}")))?;
    Ok(DashboardHandle { actor })
}
