use crate::gui_bridge::model::StageStatus;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use telemcore::processing::{PlotSnapshot, StageHandle};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Bridge exposing every stage's live plot buffer to out-of-process plot clients.
#[derive(Clone)]
pub struct PlotBridge {
    stages: Arc<Vec<Arc<StageHandle>>>,
}

impl PlotBridge {
    pub fn new(stages: &[Arc<StageHandle>]) -> Self {
        Self {
            stages: Arc::new(stages.to_vec()),
        }
    }

    pub fn status(&self) -> Vec<StageStatus> {
        self.stages
            .iter()
            .map(|handle| StageStatus::from_handle(handle))
            .collect()
    }

    fn handle(&self, stage: usize) -> Option<&Arc<StageHandle>> {
        self.stages
            .iter()
            .find(|handle| handle.kind().number() == stage)
    }

    pub fn snapshot(&self, stage: usize) -> Option<PlotSnapshot> {
        self.handle(stage).map(|handle| handle.plot().snapshot())
    }

    /// `GET /status`, `GET /stages/<n>` and `GET /stages/<n>/since/<row>`.
    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let bridge = self.clone();
        let bridge_filter = warp::any().map(move || bridge.clone());

        let status_route = warp::path!("status")
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: PlotBridge| warp::reply::json(&bridge.status()));

        let snapshot_route = warp::path!("stages" / usize)
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|stage: usize, bridge: PlotBridge| match bridge.snapshot(stage) {
                Some(snapshot) => {
                    warp::reply::with_status(warp::reply::json(&snapshot), StatusCode::OK)
                }
                None => unknown_stage(stage),
            });

        let since_route = warp::path!("stages" / usize / "since" / usize)
            .and(warp::get())
            .and(bridge_filter)
            .map(
                |stage: usize, start: usize, bridge: PlotBridge| match bridge.handle(stage) {
                    Some(handle) => warp::reply::with_status(
                        warp::reply::json(&handle.plot().rows_since(start)),
                        StatusCode::OK,
                    ),
                    None => unknown_stage(stage),
                },
            );

        status_route.or(snapshot_route).or(since_route)
    }

    /// Serves [`routes`](Self::routes) on a background runtime thread.
    pub fn serve(&self, address: SocketAddr) -> JoinHandle<()> {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("[bridge] failed to build runtime: {}", err);
                    return;
                }
            };
            info!("[bridge] serving stage plots on http://{}", address);
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        })
    }

    /// Logs every stage's row count as notifications arrive, until all stages finish.
    pub fn watch_progress(&self, log_every: usize) -> JoinHandle<()> {
        let stages = self.stages.clone();
        let log_every = log_every.max(1);
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("[bridge] failed to build progress runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                let watchers: Vec<_> = stages
                    .iter()
                    .cloned()
                    .map(|handle| tokio::spawn(watch_stage(handle, log_every)))
                    .collect();
                for watcher in watchers {
                    let _ = watcher.await;
                }
            });
        })
    }
}

fn unknown_stage(stage: usize) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({ "error": format!("unknown stage {}", stage) })),
        StatusCode::NOT_FOUND,
    )
}

async fn watch_stage(handle: Arc<StageHandle>, log_every: usize) {
    let mut receiver = handle.plot().subscribe();
    let mut last_logged = 0;
    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let rows = *receiver.borrow_and_update();
                if rows >= last_logged + log_every {
                    info!("[bridge] {} published {} rows", handle.kind(), rows);
                    last_logged = rows;
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
        if handle.state().is_terminal() {
            info!(
                "[bridge] {} finished as {:?} with {} rows",
                handle.kind(),
                handle.state(),
                handle.plot().len()
            );
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemcore::model::{TelemetryDataset, TimeSeries};
    use telemcore::prelude::{PipelineConfig, StageKind};
    use telemcore::processing::{Pipeline, StageState};

    fn finished_bridge() -> PlotBridge {
        let dataset = TelemetryDataset::new(
            TimeSeries::new(vec![(1.0, 50.0), (2.0, 60.0), (3.0, 70.0)]).unwrap(),
            TimeSeries::new(vec![(1.0, 0.0), (2.0, 0.0), (3.0, 0.1)]).unwrap(),
        )
        .unwrap();
        let config = PipelineConfig {
            kernel: vec![1.0],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::spawn(dataset, &config).unwrap();
        let bridge = PlotBridge::new(pipeline.stages());
        let progress = bridge.watch_progress(1);
        pipeline.join().unwrap();
        progress.join().unwrap();
        bridge
    }

    #[test]
    fn bridge_reports_stage_status() {
        let bridge = finished_bridge();
        let status = bridge.status();
        assert_eq!(status.len(), 3);
        assert!(status.iter().all(|s| s.state == StageState::Complete));
        assert!(status.iter().all(|s| s.rows == 3));
        assert_eq!(status[1].name, StageKind::Smoothing.to_string());
        assert!(bridge.snapshot(4).is_none());
    }

    #[tokio::test]
    async fn routes_serve_snapshots() {
        let bridge = tokio::task::spawn_blocking(finished_bridge).await.unwrap();
        let routes = bridge.routes();

        let response = warp::test::request()
            .path("/stages/2")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(snapshot["rows"].as_array().unwrap().len(), 3);

        let response = warp::test::request()
            .path("/stages/3/since/2")
            .reply(&routes)
            .await;
        let rows: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 1);

        let response = warp::test::request()
            .path("/stages/9")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = warp::test::request().path("/status").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
