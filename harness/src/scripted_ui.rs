//! Scripted stand-ins for the interactive surfaces.

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;

use pipeline::config::ProjectionConfig;
use pipeline::interfaces::{Projector, RoiOptions, Ui};
use shared::{BoundingBox, Frame, KeyEvent, KeyQueue};

/// UI that answers every prompt from canned values.
///
/// ROI selections are popped from a queue, the calibration dialog returns
/// a fixed pair, and an optional hook injects a quit key press after a
/// chosen number of displayed frames.
pub struct ScriptedUi {
    keys: Arc<KeyQueue>,
    roi_answers: VecDeque<BoundingBox>,
    min_max_answer: (i64, i64),
    monitor_list: Vec<(u32, u32)>,
    /// Push 'q' into the key queue after this many `show` calls
    pub quit_at_show: Option<usize>,
    shows: usize,
}

impl ScriptedUi {
    pub fn new(keys: Arc<KeyQueue>) -> Self {
        Self {
            keys,
            roi_answers: VecDeque::new(),
            min_max_answer: (0, 99),
            monitor_list: vec![(1920, 1080)],
            quit_at_show: None,
            shows: 0,
        }
    }

    /// Queue an answer for the next ROI prompt.
    pub fn push_roi(&mut self, bbox: BoundingBox) -> &mut Self {
        self.roi_answers.push_back(bbox);
        self
    }

    /// Set the calibration dialog's answer.
    pub fn set_min_max(&mut self, min: i64, max: i64) -> &mut Self {
        self.min_max_answer = (min, max);
        self
    }

    /// Pretend no monitor information is available.
    pub fn without_monitors(&mut self) -> &mut Self {
        self.monitor_list.clear();
        self
    }

    /// Number of frames displayed so far.
    pub fn shows(&self) -> usize {
        self.shows
    }
}

impl Ui for ScriptedUi {
    fn select_roi(&mut self, _frame: &Frame, label: &str, _options: &RoiOptions) -> BoundingBox {
        debug!("scripted ROI selection for {label:?}");
        self.roi_answers
            .pop_front()
            .expect("scripted UI ran out of ROI answers")
    }

    fn show(&mut self, _frame: &Frame, _overlay: &[String]) {
        self.shows += 1;
        if Some(self.shows) == self.quit_at_show {
            self.keys.push(KeyEvent::Char('q'));
        }
    }

    fn min_max_selector(
        &mut self,
        _image_min: &Frame,
        _image_max: &Frame,
        _info: &str,
        _title_min: &str,
        _title_max: &str,
        _lower_limit: i64,
        _upper_limit: i64,
    ) -> (i64, i64) {
        self.min_max_answer
    }

    fn monitors(&self) -> Vec<(u32, u32)> {
        self.monitor_list.clone()
    }
}

/// Projector that leaves frames untouched.
///
/// The VR tuning loop still honors the operator keys: `w`/`s` tilt phi in
/// 5 degree steps within [-80, 80] and `q` finalizes the working copy.
pub struct PassthroughProjector;

impl Projector for PassthroughProjector {
    fn project(&self, frame: &Frame, _config: &ProjectionConfig) -> Frame {
        frame.clone()
    }

    fn configure_vr(
        &self,
        _frame: &Frame,
        config: ProjectionConfig,
        keys: &KeyQueue,
    ) -> ProjectionConfig {
        let mut config = config;
        while let Some(event) = keys.poll() {
            match event {
                KeyEvent::Char('q') => break,
                KeyEvent::Char('w') => config.phi = (config.phi + 5.0).min(80.0),
                KeyEvent::Char('s') => config.phi = (config.phi - 5.0).max(-80.0),
                _ => {}
            }
        }
        config
    }
}
