//! Methods and method modifiers.
//!
//! A [`Method`] is a pipeline: a terminal core call (a plain body, or another
//! method) wrapped by layers of [`Advice`]. A class applies its modifiers for
//! one method name as a single layer batch over whatever method it inherited
//! or defined, so a subclass's modifiers always sit outside its parent's.
//!
//! Within a batch, modifiers are applied in the order Around, Before, After,
//! ties broken by declaration sequence. Each applied modifier wraps everything
//! applied before it.

use antler_core::{ObjectRef, ObjectResult, Value};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A method body: receives the invocant and positional arguments.
pub type MethodFn = dyn Fn(&ObjectRef, &[Value]) -> ObjectResult<Value>;

/// Before/after advice. The return value of the wrapped call is not visible.
pub type AdviceFn = dyn Fn(&ObjectRef, &[Value]) -> ObjectResult<()>;

/// Continuation handed to around advice: calls the next inner layer.
pub type Next<'a> = &'a dyn Fn(&[Value]) -> ObjectResult<Value>;

/// Around advice: receives the invocant, the continuation and the arguments.
pub type AroundFn = dyn Fn(&ObjectRef, Next<'_>, &[Value]) -> ObjectResult<Value>;

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Kind of a method modifier. The derived order is the application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierKind {
    Around,
    Before,
    After,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::Around => write!(f, "around"),
            ModifierKind::Before => write!(f, "before"),
            ModifierKind::After => write!(f, "after"),
        }
    }
}

/// One layer of a method pipeline.
pub trait Advice {
    fn kind(&self) -> ModifierKind;

    /// Run this layer. `next` invokes the layer beneath.
    fn apply(&self, invocant: &ObjectRef, next: Next<'_>, args: &[Value]) -> ObjectResult<Value>;
}

struct BeforeAdvice(Rc<AdviceFn>);

impl Advice for BeforeAdvice {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Before
    }

    fn apply(&self, invocant: &ObjectRef, next: Next<'_>, args: &[Value]) -> ObjectResult<Value> {
        (self.0)(invocant, args)?;
        next(args)
    }
}

struct AfterAdvice(Rc<AdviceFn>);

impl Advice for AfterAdvice {
    fn kind(&self) -> ModifierKind {
        ModifierKind::After
    }

    fn apply(&self, invocant: &ObjectRef, next: Next<'_>, args: &[Value]) -> ObjectResult<Value> {
        let result = next(args)?;
        (self.0)(invocant, args)?;
        Ok(result)
    }
}

struct AroundAdvice(Rc<AroundFn>);

impl Advice for AroundAdvice {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Around
    }

    fn apply(&self, invocant: &ObjectRef, next: Next<'_>, args: &[Value]) -> ObjectResult<Value> {
        (self.0)(invocant, next, args)
    }
}

/// A sequence-numbered modifier declared against a method name.
#[derive(Clone)]
pub struct Modifier {
    target: String,
    seq: u64,
    advice: Rc<dyn Advice>,
}

impl Modifier {
    fn new(target: impl Into<String>, advice: Rc<dyn Advice>) -> Self {
        Self {
            target: target.into(),
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            advice,
        }
    }

    pub fn before<F>(target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
    {
        Self::new(target, Rc::new(BeforeAdvice(Rc::new(f))))
    }

    pub fn after<F>(target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
    {
        Self::new(target, Rc::new(AfterAdvice(Rc::new(f))))
    }

    pub fn around<F>(target: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ObjectRef, Next<'_>, &[Value]) -> ObjectResult<Value> + 'static,
    {
        Self::new(target, Rc::new(AroundAdvice(Rc::new(f))))
    }

    pub fn kind(&self) -> ModifierKind {
        self.advice.kind()
    }

    /// Name of the method this modifier wraps.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Global declaration sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Application order key.
    pub(crate) fn order_key(&self) -> (ModifierKind, u64) {
        (self.kind(), self.seq)
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("kind", &self.kind())
            .field("target", &self.target)
            .field("seq", &self.seq)
            .finish()
    }
}

/// Declare before advice on `target`.
pub fn before<F>(target: impl Into<String>, f: F) -> Modifier
where
    F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
{
    Modifier::before(target, f)
}

/// Declare after advice on `target`.
pub fn after<F>(target: impl Into<String>, f: F) -> Modifier
where
    F: Fn(&ObjectRef, &[Value]) -> ObjectResult<()> + 'static,
{
    Modifier::after(target, f)
}

/// Declare around advice on `target`.
pub fn around<F>(target: impl Into<String>, f: F) -> Modifier
where
    F: Fn(&ObjectRef, Next<'_>, &[Value]) -> ObjectResult<Value> + 'static,
{
    Modifier::around(target, f)
}

enum Core {
    Body(Rc<MethodFn>),
    Wrapped(Method),
}

struct Pipeline {
    core: Core,
    /// Innermost first.
    layers: Vec<Rc<dyn Advice>>,
}

impl Pipeline {
    fn invoke_layer(&self, invocant: &ObjectRef, depth: usize, args: &[Value]) -> ObjectResult<Value> {
        if depth == 0 {
            return match &self.core {
                Core::Body(body) => body(invocant, args),
                Core::Wrapped(inner) => inner.invoke(invocant, args),
            };
        }
        let next = |args: &[Value]| self.invoke_layer(invocant, depth - 1, args);
        self.layers[depth - 1].apply(invocant, &next, args)
    }
}

/// A callable method: a body plus any modifier layers.
#[derive(Clone)]
pub struct Method(Rc<Pipeline>);

impl Method {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> ObjectResult<Value> + 'static,
    {
        Self(Rc::new(Pipeline {
            core: Core::Body(Rc::new(body)),
            layers: Vec::new(),
        }))
    }

    /// Wrap `self` with `modifiers`, applied in application order.
    ///
    /// Returns `self` unchanged when there is nothing to apply.
    pub fn with_modifiers(&self, modifiers: &[Modifier]) -> Method {
        if modifiers.is_empty() {
            return self.clone();
        }
        let mut sorted: Vec<&Modifier> = modifiers.iter().collect();
        sorted.sort_by_key(|m| m.order_key());
        Self(Rc::new(Pipeline {
            core: Core::Wrapped(self.clone()),
            layers: sorted.into_iter().map(|m| m.advice.clone()).collect(),
        }))
    }

    pub fn invoke(&self, invocant: &ObjectRef, args: &[Value]) -> ObjectResult<Value> {
        self.0.invoke_layer(invocant, self.0.layers.len(), args)
    }

    /// Total advice layers, including those of wrapped methods.
    pub fn depth(&self) -> usize {
        let inner = match &self.0.core {
            Core::Body(_) => 0,
            Core::Wrapped(inner) => inner.depth(),
        };
        inner + self.0.layers.len()
    }

    /// Whether two handles share the same pipeline.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("depth", &self.depth()).finish()
    }
}
