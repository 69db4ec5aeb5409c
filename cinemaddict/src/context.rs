use std::rc::Rc;

use crate::dom::Document;
use crate::settings::Settings;
use crate::timers::Timers;

/// Shared UI services handed to every controller
#[derive(Debug, Clone)]
pub struct UiContext {
    document: Rc<Document>,
    timers: Rc<Timers>,
    settings: Rc<Settings>,
}

impl UiContext {
    pub fn new(document: Rc<Document>, timers: Rc<Timers>, settings: Settings) -> Self {
        Self {
            document,
            timers,
            settings: Rc::new(settings),
        }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    pub fn timers(&self) -> &Rc<Timers> {
        &self.timers
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
