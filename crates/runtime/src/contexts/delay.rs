//! Delay: idle for a random duration.

use ai_core::PropertyKind;
use ai_core::prototypes::DelayContext;

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Delay<'p> {
    pub proto: &'p DelayContext,
}

impl<'p> Delay<'p> {
    pub fn new(proto: &'p DelayContext) -> Self {
        Self { proto }
    }
}

impl ContextHandler for Delay<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Delay
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let duration = ctx.random_ms(self.proto.min_ms, self.proto.max_ms);
        if duration == 0 {
            return Status::Completed;
        }
        ctx.blackboard
            .set_time(PropertyKind::AIDelayEndTime, ctx.now.plus_millis(duration));
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if ctx.now >= ctx.blackboard.get_time(PropertyKind::AIDelayEndTime) {
            Status::Completed
        } else {
            Status::Running
        }
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.remove_kind(PropertyKind::AIDelayEndTime);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::Vector3;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn waits_out_the_timer() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let proto = DelayContext {
            min_ms: 1_000,
            max_ms: 1_000,
        };
        let handler = Delay::new(&proto);
        assert_eq!(h.with_ctx(agent, |ctx| handler.start(ctx)), Status::Running);
        h.world.advance(999);
        assert_eq!(h.with_ctx(agent, |ctx| handler.update(ctx)), Status::Running);
        h.world.advance(1);
        assert_eq!(h.with_ctx(agent, |ctx| handler.update(ctx)), Status::Completed);
    }

    #[test]
    fn zero_delay_completes_immediately() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let proto = DelayContext::default();
        assert_eq!(
            h.with_ctx(agent, |ctx| Delay::new(&proto).start(ctx)),
            Status::Completed
        );
    }
}
