//! Background/foreground handling for running animations.
//!
//! The host forwards its own lifecycle notifications to [`LifecycleGuard::notify`];
//! there is no global notification bus.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::config::Config;
use crate::substrate::Substrate;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEvent {
    DidEnterBackground,
    WillEnterForeground,
}

/// Pauses watched animations when the host goes to the background and
/// resumes the ones it paused when it comes back. Fires no delegate events.
#[derive(Debug)]
pub struct LifecycleGuard {
    enabled: bool,
    in_background: bool,
    watched: Vec<Weak<RefCell<Animation>>>,
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl LifecycleGuard {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.pause_in_background,
            in_background: false,
            watched: Vec::new(),
        }
    }

    /// Track `animation` until it is dropped.
    pub fn watch(&mut self, animation: &Rc<RefCell<Animation>>) {
        let weak = Rc::downgrade(animation);
        if !self.watched.iter().any(|w| w.ptr_eq(&weak)) {
            self.watched.push(weak);
        }
    }

    pub fn watched_count(&self) -> usize {
        self.watched.iter().filter(|w| w.strong_count() > 0).count()
    }

    #[inline]
    pub fn is_in_background(&self) -> bool {
        self.in_background
    }

    pub fn notify(&mut self, substrate: &mut dyn Substrate, event: LifecycleEvent) {
        let entering = event == LifecycleEvent::DidEnterBackground;
        if entering == self.in_background {
            return;
        }
        self.in_background = entering;
        self.watched.retain(|w| w.strong_count() > 0);
        if !self.enabled {
            return;
        }
        debug!("lifecycle: {event:?}, {} animation(s) watched", self.watched.len());
        for animation in self.watched.iter().filter_map(Weak::upgrade) {
            // an animation borrowed elsewhere is mid-call; leave it alone
            let Ok(mut animation) = animation.try_borrow_mut() else {
                warn!("lifecycle: skipping {event:?} for an animation that is already borrowed");
                continue;
            };
            match event {
                LifecycleEvent::DidEnterBackground => animation.pause_for_background(substrate),
                LifecycleEvent::WillEnterForeground => animation.resume_for_foreground(substrate),
            }
        }
    }
}
