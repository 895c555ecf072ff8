use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::viewer::{PointCloud, PointCloudHandle, Viewer, update_points};
use crate::visualization::{ORANGE, colored_by_id, colored_flat};

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    /// Stack "all" features on top of the in-state points.
    pub include_all: bool,
    /// Number of most recent in-state frames kept on screen.
    pub keep: usize,
    pub frame_interval: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            include_all: false,
            keep: 1,
            frame_interval: Duration::from_secs_f64(1.0 / 60.0),
        }
    }
}

impl ReplayConfig {
    /// Sets the interval to `1 / fps`. A non-positive `fps` means no pause.
    pub fn with_fps(mut self, fps: f64) -> Result<Self> {
        self.frame_interval = if fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).map_err(|_| Error::InvalidFps(fps))?
        } else if fps.is_nan() {
            return Err(Error::InvalidFps(fps));
        } else {
            Duration::ZERO
        };
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Running,
    PausedAwaitingExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames_shown: usize,
    pub last_timestamp: Option<i64>,
    /// `false` when the viewer went away before the last frame.
    pub completed: bool,
}

/// Steps through in-state frames in timestamp order, pushing each into the
/// viewer's point cloud.
pub struct Replay<'a> {
    instate: &'a FeatureSet,
    all: &'a FeatureSet,
    config: ReplayConfig,
    recent: VecDeque<PointCloud>,
    next: usize,
    state: ReplayState,
}

impl<'a> Replay<'a> {
    pub fn new(instate: &'a FeatureSet, all: &'a FeatureSet, config: ReplayConfig) -> Self {
        Self {
            instate,
            all,
            config,
            recent: VecDeque::new(),
            next: 0,
            state: ReplayState::Running,
        }
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Shows the next frame. Returns its timestamp, or `None` once the replay
    /// is over.
    pub fn step<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        handle: &mut PointCloudHandle,
    ) -> Result<Option<i64>> {
        if self.state == ReplayState::PausedAwaitingExit {
            return Ok(None);
        }
        let instate = self.instate;
        let Some(frame) = instate.frames().get(self.next) else {
            self.state = ReplayState::PausedAwaitingExit;
            return Ok(None);
        };
        self.next += 1;
        let ts = frame.timestamp;

        if let Some(table) = &frame.table {
            self.recent.push_back(colored_by_id(table));
            while self.recent.len() > self.config.keep.max(1) {
                self.recent.pop_front();
            }
            let mut cloud = PointCloud::default();
            for c in &self.recent {
                cloud.stack(c);
            }
            update_points(handle, cloud);
        }

        if self.config.include_all {
            match self.all.table(ts) {
                Some(table) => {
                    let mut cloud = handle.cloud.clone();
                    cloud.stack(&colored_flat(table, ORANGE));
                    update_points(handle, cloud);
                }
                None => log::debug!("no \"all\" features at {}", ts),
            }
        }

        log::info!("{}", ts);
        viewer.update_point_cloud(handle.id, &handle.cloud)?;
        if !viewer.poll_events()? {
            log::warn!("viewer closed at {}, stopping replay", ts);
            self.state = ReplayState::PausedAwaitingExit;
            return Ok(Some(ts));
        }
        viewer.render_frame()?;
        Ok(Some(ts))
    }

    /// Replays every frame, sleeping `frame_interval` after each one.
    pub fn run<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        handle: &mut PointCloudHandle,
    ) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary {
            frames_shown: 0,
            last_timestamp: None,
            completed: true,
        };
        while let Some(ts) = self.step(viewer, handle)? {
            summary.frames_shown += 1;
            summary.last_timestamp = Some(ts);
            if self.state == ReplayState::PausedAwaitingExit {
                summary.completed = self.next == self.instate.len();
                break;
            }
            if !self.config.frame_interval.is_zero() {
                std::thread::sleep(self.config.frame_interval);
            }
        }
        self.state = ReplayState::PausedAwaitingExit;
        Ok(summary)
    }
}

/// Runs a whole replay and then calls `wait_for_exit`.
pub fn replay<V, F>(
    viewer: &mut V,
    handle: &mut PointCloudHandle,
    instate: &FeatureSet,
    all: &FeatureSet,
    config: ReplayConfig,
    wait_for_exit: F,
) -> Result<ReplaySummary>
where
    V: Viewer + ?Sized,
    F: FnOnce() -> Result<()>,
{
    let mut replay = Replay::new(instate, all, config);
    let summary = replay.run(viewer, handle)?;
    log::debug!(
        "replayed {} frames, completed: {}",
        summary.frames_shown,
        summary.completed
    );
    wait_for_exit()?;
    Ok(summary)
}
