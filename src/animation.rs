//! One-shot animation clips exposed by the asset collaborator.

/// A playable clip with loop-once-and-hold-last-frame policy. `reset`
/// rewinds to the first frame; `play` starts playback once.
pub trait AnimationClip {
    fn reset(&mut self);
    fn play(&mut self);
}

/// The asset's animation clips, started together by the lifecycle's
/// one-shot trigger.
#[derive(Default)]
pub struct ClipSet {
    clips: Vec<Box<dyn AnimationClip>>,
}

impl ClipSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, clip: Box<dyn AnimationClip>) {
        self.clips.push(clip);
    }

    /// Reset and start every clip concurrently.
    pub fn play_all(&mut self) {
        for clip in &mut self.clips {
            clip.reset();
            clip.play();
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }
}
