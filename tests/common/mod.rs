//! Recording stand-in for a speech engine

#![allow(dead_code)]

use speakpad::speech::{
    PlatformEvent, SpeechPlatform, Subscribers, SubscriptionId, UtteranceId, UtteranceRequest,
    VoiceInfo,
};
use speakpad::{Result, SpeakpadError};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

/// Everything the form asked the engine to do
#[derive(Debug, Default)]
pub struct Calls {
    pub spoken: Vec<UtteranceRequest>,
    pub cancels: usize,
    pub voice_queries: usize,
    pub unsubscribed: Vec<SubscriptionId>,
}

/// Switches that make the next engine calls fail
#[derive(Debug, Default)]
pub struct Failures {
    pub voices: bool,
    pub speak: bool,
    pub cancel: bool,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.spoken.len() + self.cancels
    }
}

pub struct FakePlatform {
    pub calls: Rc<RefCell<Calls>>,
    pub voices: Rc<RefCell<Vec<VoiceInfo>>>,
    pub subscribers: Rc<RefCell<Subscribers>>,
    pub failures: Rc<RefCell<Failures>>,
}

impl FakePlatform {
    pub fn with_languages(languages: &[&str]) -> Self {
        Self::from_voices(
            languages
                .iter()
                .map(|lang| VoiceInfo {
                    name: format!("Voice {}", lang),
                    language: lang.to_string(),
                })
                .collect(),
        )
    }

    /// Voices given as (name, language) pairs
    pub fn with_voices(voices: &[(&str, &str)]) -> Self {
        Self::from_voices(
            voices
                .iter()
                .map(|(name, lang)| VoiceInfo {
                    name: name.to_string(),
                    language: lang.to_string(),
                })
                .collect(),
        )
    }

    fn from_voices(voices: Vec<VoiceInfo>) -> Self {
        Self {
            calls: Rc::default(),
            voices: Rc::new(RefCell::new(voices)),
            subscribers: Rc::default(),
            failures: Rc::default(),
        }
    }

    pub fn failures(&self) -> Rc<RefCell<Failures>> {
        Rc::clone(&self.failures)
    }

    /// Handles the test keeps after the platform moves into the form
    pub fn handles(
        &self,
    ) -> (
        Rc<RefCell<Calls>>,
        Rc<RefCell<Vec<VoiceInfo>>>,
        Rc<RefCell<Subscribers>>,
    ) {
        (
            Rc::clone(&self.calls),
            Rc::clone(&self.voices),
            Rc::clone(&self.subscribers),
        )
    }
}

impl SpeechPlatform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    fn list_voices(&mut self) -> Result<Vec<VoiceInfo>> {
        self.calls.borrow_mut().voice_queries += 1;
        if self.failures.borrow().voices {
            return Err(SpeakpadError::Speech("voice query failed".to_string()));
        }
        Ok(self.voices.borrow().clone())
    }

    fn subscribe(&mut self, sink: Sender<PlatformEvent>) -> Option<SubscriptionId> {
        Some(self.subscribers.borrow_mut().add(sink))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.borrow_mut().remove(id);
        self.calls.borrow_mut().unsubscribed.push(id);
    }

    /// Utterance ids count up from 1 in speaking order
    fn speak(&mut self, request: &UtteranceRequest) -> Result<UtteranceId> {
        if self.failures.borrow().speak {
            return Err(SpeakpadError::Speech("speak failed".to_string()));
        }
        let mut calls = self.calls.borrow_mut();
        calls.spoken.push(request.clone());
        Ok(calls.spoken.len() as UtteranceId)
    }

    fn cancel(&mut self) -> Result<()> {
        if self.failures.borrow().cancel {
            return Err(SpeakpadError::Speech("cancel failed".to_string()));
        }
        self.calls.borrow_mut().cancels += 1;
        Ok(())
    }
}
