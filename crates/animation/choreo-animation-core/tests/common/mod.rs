#![allow(dead_code)]

use std::cell::RefCell;

use choreo_animation_core::{Animation, AnimationDelegate, AnimationStep, Scene};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    WillStart { animated: bool },
    StepFinished { tag: Option<String>, animated: bool },
    DidStop { animated: bool, cancelling: bool, terminating: bool },
}

/// Delegate that records every callback in order.
#[derive(Default)]
pub struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn steps_finished(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::StepFinished { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AnimationDelegate for Recorder {
    fn animation_will_start(&self, _animation: &Animation, animated: bool) {
        self.events.borrow_mut().push(Event::WillStart { animated });
    }

    fn animation_did_stop(&self, animation: &Animation, animated: bool) {
        self.events.borrow_mut().push(Event::DidStop {
            animated,
            cancelling: animation.is_cancelling(),
            terminating: animation.is_terminating(),
        });
    }

    fn animation_step_finished(&self, _animation: &Animation, step: &AnimationStep, animated: bool) {
        self.events.borrow_mut().push(Event::StepFinished {
            tag: step.tag().map(str::to_owned),
            animated,
        });
    }
}

pub fn finished(tag: &str, animated: bool) -> Event {
    Event::StepFinished {
        tag: Some(tag.to_owned()),
        animated,
    }
}

/// Drive `animation` in `dt` ticks until it stops. Returns the simulated time.
pub fn run_until_idle(scene: &mut Scene, animation: &mut Animation, dt: f32) -> f32 {
    let mut ticks = 0u32;
    while animation.is_running() {
        scene.drive(animation, dt);
        ticks += 1;
        assert!(ticks < 100_000, "animation never stopped");
    }
    ticks as f32 * dt
}

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}
