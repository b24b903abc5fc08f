//! Environment frames.

use cirius_util::{define_idx, IndexVec};
use indexmap::IndexMap;

use crate::value::Value;

define_idx!(FrameId);

/// One scope frame: bindings plus a lexical parent pointer.
#[derive(Debug)]
struct Frame {
    vars: IndexMap<String, Value>,
    parent: Option<FrameId>,
}

/// A stack arena of frames.
///
/// Frame 0 is the globals frame and lives for the whole run. Call and
/// block frames are pushed on entry and released on exit; parents always
/// sit below their children, so releasing truncates the stack.
#[derive(Debug)]
pub struct Environment {
    frames: IndexVec<FrameId, Frame>,
}

impl Environment {
    pub const GLOBALS: FrameId = FrameId(0);

    pub fn new() -> Self {
        let mut frames = IndexVec::new();
        frames.push(Frame {
            vars: IndexMap::new(),
            parent: None,
        });
        Self { frames }
    }

    /// Push a frame whose lexical parent is `parent`.
    pub fn push_frame(&mut self, parent: FrameId) -> FrameId {
        self.frames.push(Frame {
            vars: IndexMap::new(),
            parent: Some(parent),
        })
    }

    /// Stack depth marker for later release.
    pub fn mark(&self) -> usize {
        self.frames.len()
    }

    /// Drop every frame pushed since `mark`.
    pub fn release(&mut self, mark: usize) {
        self.frames.truncate(mark);
    }

    /// Look `name` up the parent chain starting at `frame`.
    pub fn get(&self, frame: FrameId, name: &str) -> Option<&Value> {
        let mut frame_id = frame;
        loop {
            let frame = &self.frames[frame_id];
            if let Some(value) = frame.vars.get(name) {
                return Some(value);
            }
            frame_id = frame.parent?;
        }
    }

    /// Bind `name` in `frame` unconditionally.
    pub fn define(&mut self, frame: FrameId, name: &str, value: Value) {
        self.frames[frame].vars.insert(name.to_string(), value);
    }

    /// Store into the innermost frame that already binds `name`, or
    /// define it in `frame` when no enclosing frame does. A new name
    /// introduced inside a block therefore stays local to the block,
    /// while stores to an enclosing binding mutate it in place.
    pub fn assign(&mut self, frame: FrameId, name: &str, value: Value) {
        let mut frame_id = frame;
        let target = loop {
            let current = &self.frames[frame_id];
            if current.vars.contains_key(name) {
                break frame_id;
            }
            match current.parent {
                Some(parent) => frame_id = parent,
                None => break frame,
            }
        };
        self.frames[target].vars.insert(name.to_string(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_the_parent_chain() {
        let mut env = Environment::new();
        env.define(Environment::GLOBALS, "g", Value::Int(1));
        let inner = env.push_frame(Environment::GLOBALS);
        assert_eq!(env.get(inner, "g"), Some(&Value::Int(1)));
        assert_eq!(env.get(inner, "missing"), None);
    }

    #[test]
    fn assign_updates_the_binding_frame() {
        let mut env = Environment::new();
        let outer = env.push_frame(Environment::GLOBALS);
        env.define(outer, "x", Value::Int(0));

        let inner = env.push_frame(outer);
        env.assign(inner, "x", Value::Int(5));

        assert_eq!(env.get(outer, "x"), Some(&Value::Int(5)));
        assert!(env.frames[inner].vars.is_empty());
    }

    #[test]
    fn assign_to_new_name_stays_in_current_frame() {
        let mut env = Environment::new();
        let outer = env.push_frame(Environment::GLOBALS);
        let inner = env.push_frame(outer);

        env.assign(inner, "fresh", Value::Int(7));

        assert_eq!(env.get(inner, "fresh"), Some(&Value::Int(7)));
        assert_eq!(env.get(outer, "fresh"), None);
    }

    #[test]
    fn release_drops_frames_pushed_after_mark() {
        let mut env = Environment::new();
        let mark = env.mark();
        let frame = env.push_frame(Environment::GLOBALS);
        env.define(frame, "temp", Value::Int(1));
        env.release(mark);
        assert_eq!(env.mark(), mark);
    }

    #[test]
    fn call_frames_do_not_see_caller_locals() {
        let mut env = Environment::new();
        let caller = env.push_frame(Environment::GLOBALS);
        env.define(caller, "local", Value::Int(1));

        let callee = env.push_frame(Environment::GLOBALS);
        assert_eq!(env.get(callee, "local"), None);
    }
}
