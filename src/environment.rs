use crate::error::LevError;
use crate::lexer::Token;
use crate::value::Value;
use std::collections::HashMap;
use tracing::trace;

/// Index of a scope frame inside an [`Environment`].
type FrameId = usize;

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Value>,
    enclosing: Option<FrameId>,
}

/// Chain of lexical scopes stored as an arena of frames.
///
/// Frames link to their parent by index. Scopes nest strictly, so the arena
/// behaves as a stack: `push_scope` opens a child of the active frame and
/// `pop_scope` drops it and reactivates the parent. Frame 0 is the global
/// scope and is never popped.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    active: FrameId,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            active: 0,
        }
    }

    /// Number of live frames, the global scope included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame {
            values: HashMap::new(),
            enclosing: Some(self.active),
        });
        self.active = self.frames.len() - 1;
        trace!(frame = self.active, "scope entered");
    }

    pub fn pop_scope(&mut self) {
        if self.active == 0 {
            return;
        }
        let frame = self.frames.pop();
        self.active = frame.and_then(|f| f.enclosing).unwrap_or(0);
        trace!(frame = self.active, "scope restored");
    }

    /// Bind `name` in the active frame, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!(name, frame = self.active, "define");
        self.frames[self.active]
            .values
            .insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, LevError> {
        let mut frame = Some(self.active);
        while let Some(id) = frame {
            if let Some(value) = self.frames[id].values.get(&name.lexeme) {
                return Ok(value.clone());
            }
            frame = self.frames[id].enclosing;
        }

        Err(undefined(name))
    }

    /// Overwrite the nearest existing binding of `name`. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), LevError> {
        let mut frame = Some(self.active);
        while let Some(id) = frame {
            if let Some(slot) = self.frames[id].values.get_mut(&name.lexeme) {
                trace!(name = %name.lexeme, frame = id, "assign");
                *slot = value;
                return Ok(());
            }
            frame = self.frames[id].enclosing;
        }

        Err(undefined(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &Token) -> LevError {
    LevError::runtime_error(name, format!("Undefined variable '{}'.", name.lexeme))
}
