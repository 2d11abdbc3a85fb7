use super::{
    EngineControl, EngineEvent, EngineFault, FaultAction, SourceCapability, TimelineProvider,
    TimelineStore,
};
use parking_lot::RwLock;
use std::sync::Arc;
use timeshift_media::FragmentTimeline;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Engine health as seen by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatus {
    /// Full reinitializations triggered by fatal faults.
    pub reinitializations: u64,
    /// Details of the most recent fatal fault.
    pub last_fatal: Option<String>,
}

#[derive(Default)]
struct Shared {
    store: TimelineStore,
    live_position: RwLock<Option<f64>>,
    total_duration: RwLock<Option<f64>>,
    status: RwLock<EngineStatus>,
}

/// Timeline maintained from streaming engine events.
#[derive(Clone)]
pub struct NativeEngineProvider {
    shared: Arc<Shared>,
}

impl NativeEngineProvider {
    /// Spawn the event pump. Each event is consumed exactly once.
    pub fn spawn(
        events: mpsc::Receiver<EngineEvent>,
        control: Arc<dyn EngineControl>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let provider = Self {
            shared: Arc::new(Shared::default()),
        };
        let pump = EventPump {
            shared: provider.shared.clone(),
            control,
        };
        let handle = tokio::spawn(pump.run(events, cancel));
        (provider, handle)
    }

    pub fn status(&self) -> EngineStatus {
        self.shared.status.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.store.generation()
    }
}

impl TimelineProvider for NativeEngineProvider {
    fn capability(&self) -> SourceCapability {
        SourceCapability::NativeMetadata
    }

    fn timeline(&self) -> Arc<FragmentTimeline> {
        self.shared.store.snapshot()
    }

    fn live_position(&self) -> Option<f64> {
        *self.shared.live_position.read()
    }

    fn total_duration(&self) -> Option<f64> {
        *self.shared.total_duration.read()
    }
}

struct EventPump {
    shared: Arc<Shared>,
    control: Arc<dyn EngineControl>,
}

impl EventPump {
    async fn run(self, mut events: mpsc::Receiver<EngineEvent>, cancel: CancellationToken) {
        tracing::debug!("Engine event pump started");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => {
                        tracing::debug!("Engine event stream closed");
                        break;
                    }
                },
            }
        }

        tracing::debug!("Engine event pump stopped");
    }

    async fn handle(&self, event: EngineEvent) {
        match event {
            EngineEvent::LevelLoaded {
                kind,
                fragments,
                total_duration,
            } => {
                *self.shared.total_duration.write() = total_duration.filter(|d| d.is_finite());
                self.shared
                    .store
                    .replace(FragmentTimeline::new(kind, fragments));
            }
            EngineEvent::LiveSync(position) => {
                if position.is_finite() {
                    *self.shared.live_position.write() = Some(position);
                }
            }
            EngineEvent::Fault(fault) => self.handle_fault(fault).await,
        }
    }

    async fn handle_fault(&self, fault: EngineFault) {
        let action = fault.action();
        let result = match action {
            FaultAction::RetryLoad => {
                tracing::warn!(details = %fault.details, "Engine network fault, retrying load");
                self.control.retry_load().await
            }
            FaultAction::RecoverMedia => {
                tracing::warn!(details = %fault.details, "Engine media fault, recovering");
                self.control.recover_media().await
            }
            FaultAction::Reinitialize => {
                tracing::error!(
                    kind = ?fault.kind,
                    details = %fault.details,
                    "Fatal engine fault, reinitializing"
                );
                {
                    let mut status = self.shared.status.write();
                    status.reinitializations += 1;
                    status.last_fatal = Some(fault.details.clone());
                }
                self.control.reinitialize().await
            }
            FaultAction::Ignore => {
                tracing::debug!(details = %fault.details, "Ignoring non-fatal engine fault");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!(action = ?action, "Engine fault handling failed: {}", e);
        }
    }
}
