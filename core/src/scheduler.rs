#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskToken(pub u64);

/// A tick returns `true` once its work is done; the scheduler then cancels the task.
pub type Tick = Box<dyn FnMut() -> bool>;

/// Cancellable periodic tasks.
pub trait Scheduler {
    fn start(&mut self, interval_ms: u32, tick: Tick) -> TaskToken;
    fn cancel(&mut self, token: TaskToken);
    fn is_active(&self, token: TaskToken) -> bool;
}

struct ManualTask {
    token: TaskToken,
    interval_ms: u32,
    next_due_ms: u64,
    tick: Tick,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_token: u64,
    tasks: Vec<ManualTask>,
    cancellations: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations
    }

    pub fn advance(&mut self, ms: u64) {
        let end = self.now_ms.saturating_add(ms);
        loop {
            let due = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, task)| task.next_due_ms <= end)
                .min_by_key(|(_, task)| task.next_due_ms)
                .map(|(index, _)| index);
            let Some(index) = due else {
                break;
            };
            let task = &mut self.tasks[index];
            self.now_ms = task.next_due_ms;
            task.next_due_ms += u64::from(task.interval_ms.max(1));
            if (task.tick)() {
                self.tasks.remove(index);
                self.cancellations += 1;
            }
        }
        self.now_ms = end;
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, interval_ms: u32, tick: Tick) -> TaskToken {
        self.next_token += 1;
        let token = TaskToken(self.next_token);
        self.tasks.push(ManualTask {
            token,
            interval_ms,
            next_due_ms: self.now_ms + u64::from(interval_ms.max(1)),
            tick,
        });
        token
    }

    fn cancel(&mut self, token: TaskToken) {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.token != token);
        if self.tasks.len() != before {
            self.cancellations += 1;
        }
    }

    fn is_active(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|task| task.token == token)
    }
}
