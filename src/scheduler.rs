use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo::timers::callback::Interval;
use wasm_bindgen_futures::spawn_local;

use pool_guideline_core::{Scheduler, TaskToken, Tick};

/// [`Scheduler`] over browser intervals.
#[derive(Clone, Default)]
pub struct IntervalScheduler {
    last_token: Rc<Cell<u64>>,
    tasks: Rc<RefCell<HashMap<TaskToken, Interval>>>,
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, interval_ms: u32, mut tick: Tick) -> TaskToken {
        let token = TaskToken(self.last_token.get() + 1);
        self.last_token.set(token.0);
        let tasks = Rc::downgrade(&self.tasks);
        let interval = Interval::new(interval_ms, move || {
            if !tick() {
                return;
            }
            let Some(tasks) = tasks.upgrade() else {
                return;
            };
            // An interval cannot be dropped from inside its own callback.
            spawn_local(async move {
                tasks.borrow_mut().remove(&token);
            });
        });
        self.tasks.borrow_mut().insert(token, interval);
        token
    }

    fn cancel(&mut self, token: TaskToken) {
        self.tasks.borrow_mut().remove(&token);
    }

    fn is_active(&self, token: TaskToken) -> bool {
        self.tasks.borrow().contains_key(&token)
    }
}
