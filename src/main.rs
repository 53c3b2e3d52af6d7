//! AR overlay demo: runs a scripted tracking session against stub
//! collaborators and exports one capture artifact to disk.

use anyhow::Result;
use ar_overlay::animation::{AnimationClip, ClipSet};
use ar_overlay::app::{AnchorSource, Collaborators, OverlayApp};
use ar_overlay::capture::{
    DownloadAnchor, EncodedImage, ExportEnv, Platform, ShareFile, ShareRejected, StaticRenderTarget, VideoSource,
};
use ar_overlay::config::Config;
use ar_overlay::events::{TrackingEvent, TrackingListener};
use ar_overlay::lifecycle::AssetRoot;
use ar_overlay::pose::Pose;
use ar_overlay::smoothing::SensitivityProfile;
use clap::Parser;
use image::RgbaImage;
use log::info;
use nalgebra::Vector3;
use std::cell::Cell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sensitivity profile (low, medium, high)
    #[arg(short, long, default_value = "medium")]
    sensitivity: String,

    /// Platform to simulate (ios, android-share, android-legacy, desktop)
    #[arg(short, long, default_value = "ios")]
    platform: String,

    /// Number of simulated frames (60 per second)
    #[arg(short, long, default_value = "400")]
    frames: u32,

    /// Directory for exported capture artifacts
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,
}

/// Scripted tracker: target appears, disappears mid-session, reappears.
/// The frame counter is shared with the demo loop through an `Rc` so the
/// loop can advance it from outside the app.
struct ScriptedAnchor {
    events: VecDeque<(u32, TrackingEvent)>,
    frame: Rc<Cell<u32>>,
    visible: bool,
}

impl ScriptedAnchor {
    fn new(total_frames: u32, frame: Rc<Cell<u32>>) -> Self {
        let lost_at = total_frames / 2;
        let events = VecDeque::from(vec![
            (10, TrackingEvent::TargetFound),
            (lost_at, TrackingEvent::TargetLost),
            (lost_at + 20, TrackingEvent::TargetFound),
        ]);
        Self {
            events,
            frame,
            visible: false,
        }
    }
}

impl AnchorSource for ScriptedAnchor {
    fn poll_event(&mut self) -> Option<TrackingEvent> {
        if let Some(&(at, event)) = self.events.front() {
            if self.frame.get() >= at {
                self.events.pop_front();
                self.visible = event == TrackingEvent::TargetFound;
                return Some(event);
            }
        }
        None
    }

    fn raw_pose(&self) -> Option<Pose> {
        if !self.visible {
            return None;
        }
        // Slow orbit with per-frame measurement jitter
        let t = f64::from(self.frame.get()) / 60.0;
        let jitter = || (rand::random::<f64>() - 0.5) * 0.02;
        Some(Pose::from_euler(
            Vector3::new(t.sin() * 0.2 + jitter(), t.cos() * 0.2 + jitter(), jitter()),
            0.0,
            0.0,
            t * 0.3 + jitter(),
            t,
        ))
    }
}

/// Stand-in for the scene-graph node holding the rigged asset.
struct DemoAsset {
    pose: Pose,
}

impl AssetRoot for DemoAsset {
    fn set_visible(&mut self, visible: bool) {
        log::debug!("Asset visible: {visible}");
    }
    fn set_opacity(&mut self, alpha: f64) {
        log::debug!("Asset opacity: {alpha:.2}");
    }
    fn apply_pose(&mut self, pose: &Pose) {
        self.pose = *pose;
    }
    fn committed_pose(&self) -> Pose {
        self.pose
    }
}

struct DemoClip {
    name: &'static str,
}

impl AnimationClip for DemoClip {
    fn reset(&mut self) {}
    fn play(&mut self) {
        info!("Animation clip '{}' playing", self.name);
    }
}

/// Synthetic camera feed: a flat gray frame.
struct DemoCamera {
    width: u32,
    height: u32,
}

impl VideoSource for DemoCamera {
    fn current_frame(&self) -> Option<RgbaImage> {
        Some(RgbaImage::from_pixel(self.width, self.height, image::Rgba([90, 90, 90, 255])))
    }
}

/// Export environment backed by the local filesystem.
struct FileExportEnv {
    output: PathBuf,
}

struct FileAnchor {
    output: PathBuf,
}

impl DownloadAnchor for FileAnchor {
    fn download(&mut self, filename: &str, image: &EncodedImage) {
        let path = self.output.join(filename);
        match std::fs::write(&path, &image.bytes) {
            Ok(()) => info!("Wrote {} ({} bytes, {})", path.display(), image.bytes.len(), image.mime),
            Err(e) => log::warn!("Failed to write {}: {}", path.display(), e),
        }
    }
}

impl ExportEnv for FileExportEnv {
    fn create_anchor(&mut self) -> Box<dyn DownloadAnchor> {
        Box::new(FileAnchor {
            output: self.output.clone(),
        })
    }

    fn share(&mut self, file: ShareFile<'_>) -> std::result::Result<(), ShareRejected> {
        let path = self.output.join(file.name);
        std::fs::write(&path, file.bytes).map_err(|e| ShareRejected(e.to_string()))?;
        info!("Shared '{}' as {}", file.title, path.display());
        Ok(())
    }
}

/// Non-AR chrome reacting to tracking events over the bus.
struct ChromeListener;

impl TrackingListener for ChromeListener {
    fn on_tracking_event(&mut self, event: TrackingEvent) {
        match event {
            TrackingEvent::TargetFound => info!("UI: hiding scanning prompt"),
            TrackingEvent::TargetLost => info!("UI: showing scanning prompt"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("AR overlay demo session");

    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let platform = match args.platform.as_str() {
        "ios" => Platform::IosLike,
        "android-share" => Platform::AndroidShare,
        "android-legacy" => Platform::AndroidLegacy,
        _ => Platform::Desktop,
    };

    let mut clips = ClipSet::new();
    clips.add(Box::new(DemoClip { name: "idle-wave" }));
    clips.add(Box::new(DemoClip { name: "tail-swish" }));

    let frame_counter = Rc::new(Cell::new(0));
    let collaborators = Collaborators {
        anchor: Box::new(ScriptedAnchor::new(args.frames, Rc::clone(&frame_counter))),
        asset: Box::new(DemoAsset {
            pose: Pose::identity(0.0),
        }),
        clips,
        video: Box::new(DemoCamera {
            width: 640,
            height: 480,
        }),
        render: Box::new(StaticRenderTarget::solid(640, 480, [0, 0, 0, 0])),
        export: Box::new(FileExportEnv {
            output: args.output.clone(),
        }),
    };

    let mut app = OverlayApp::new(config, platform, collaborators)?;
    app.subscribe(Box::new(ChromeListener));
    app.set_sensitivity(SensitivityProfile::from_name(&args.sensitivity)?);

    for frame in 0..args.frames {
        // The demo steps the cooperative frame loop at 60 ticks per second.
        frame_counter.set(frame);
        let now = f64::from(frame) / 60.0;
        app.tick(now);

        // A user capture fires three quarters of the way through.
        if frame == args.frames * 3 / 4 {
            let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
            let outcome = app.capture(timestamp_ms)?;
            info!("Capture outcome: {:?}", outcome);
        }
    }

    info!("Session finished in state {:?}", app.state());
    Ok(())
}
