//! Single-threaded shared handles for collaborators.
//!
//! The controller and the chute each own a boxed collaborator, while the
//! headless driver still needs to reach the same object (to start music, save
//! the collection, or read the fader). `Shared` hands out clones that all point
//! at one value.

use clawcade_core::{
    AudioCues, PlayDisplay, PrizeCollection, PrizeId, SceneTransition, SessionObserver, SoundId,
};
use glam::Vec2;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: AudioCues> AudioCues for Shared<T> {
    fn play_one_shot(&mut self, cue: SoundId, position: Vec2, volume: f32) {
        self.borrow_mut().play_one_shot(cue, position, volume);
    }

    fn stop_music(&mut self) {
        self.borrow_mut().stop_music();
    }
}

impl<T: SceneTransition> SceneTransition for Shared<T> {
    fn fade_to_scene(&mut self, name: &str) {
        self.borrow_mut().fade_to_scene(name);
    }
}

impl<T: PlayDisplay> PlayDisplay for Shared<T> {
    fn update_display(&mut self, remaining_plays: u32) {
        self.borrow_mut().update_display(remaining_plays);
    }
}

impl<T: SessionObserver> SessionObserver for Shared<T> {
    fn session_ended(&mut self) {
        self.borrow_mut().session_ended();
    }
}

impl<T: PrizeCollection> PrizeCollection for Shared<T> {
    fn add_prize(&mut self, id: &PrizeId) {
        self.borrow_mut().add_prize(id);
    }

    fn has_prize(&self, id: &PrizeId) -> bool {
        self.borrow().has_prize(id)
    }

    fn collected_prizes(&self) -> Vec<PrizeId> {
        self.borrow().collected_prizes()
    }
}
