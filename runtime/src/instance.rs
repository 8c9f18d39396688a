//! Live instances.
//!
//! An [`Instance`] holds one slot per attribute in its class layout. A slot is
//! unset, pending (a lazy thunk not yet evaluated) or set. Public names are
//! dispatched through the class member table.

use crate::delegation;
use antler_core::{Object, ObjectError, ObjectRef, ObjectResult, Value};
use antler_registry::{Attribute, Class, DefaultValue, Member, ProducerFn};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Deferred initial value of a lazy attribute.
#[derive(Clone)]
pub(crate) enum Thunk {
    Value(Value),
    Producer(Rc<ProducerFn>),
    Builder(String),
}

impl From<&DefaultValue> for Thunk {
    fn from(default: &DefaultValue) -> Self {
        match default {
            DefaultValue::Value(value) => Thunk::Value(value.clone()),
            DefaultValue::Producer(producer) => Thunk::Producer(producer.clone()),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) enum Slot {
    #[default]
    Unset,
    Pending(Thunk),
    Set(Value),
}

/// An object of a compiled class.
///
/// Object-valued slots hold strong references. Objects that refer to each
/// other, or to themselves, form an `Rc` cycle that is never freed until one
/// of the links is removed with [`Object::delete`] or overwritten.
pub struct Instance {
    class: Class,
    slots: RefCell<Vec<Slot>>,
    me: Weak<Instance>,
}

impl Instance {
    /// Allocate an instance with every slot unset.
    pub(crate) fn allocate(class: Class) -> Rc<Self> {
        let slots = vec![Slot::Unset; class.attributes().len()];
        Rc::new_cyclic(|me| Self {
            class,
            slots: RefCell::new(slots),
            me: me.clone(),
        })
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    /// A shared handle to this instance.
    pub fn handle(&self) -> ObjectResult<ObjectRef> {
        match self.me.upgrade() {
            Some(me) => Ok(me as ObjectRef),
            None => Err(ObjectError::custom(format!(
                "'{}' object is being dropped",
                self.class.name()
            ))),
        }
    }

    /// Whether the attribute holds a value. Pending lazy attributes are not set.
    pub fn is_set(&self, attr: &str) -> bool {
        self.class
            .attribute(attr)
            .map_or(false, |a| matches!(self.slots.borrow()[a.index], Slot::Set(_)))
    }

    /// Whether the attribute is waiting on a lazy default or builder.
    pub fn is_pending(&self, attr: &str) -> bool {
        self.class
            .attribute(attr)
            .map_or(false, |a| matches!(self.slots.borrow()[a.index], Slot::Pending(_)))
    }

    pub(crate) fn attribute_at(&self, index: usize) -> &Attribute {
        &self.class.attributes()[index]
    }

    /// Read a slot, materializing a pending thunk on first access.
    pub(crate) fn read(&self, attr: &Attribute) -> ObjectResult<Value> {
        let thunk = match &self.slots.borrow()[attr.index] {
            Slot::Set(value) => return Ok(value.clone()),
            Slot::Unset => return Err(ObjectError::not_set(self.class.name(), &attr.name)),
            Slot::Pending(thunk) => thunk.clone(),
        };
        tracing::trace!(class = %self.class.name(), attr = %attr.name, "materializing lazy attribute");
        let value = self.evaluate(&thunk)?;
        self.write(attr, value.clone(), true)?;
        Ok(value)
    }

    /// Assign a slot. `force` bypasses read-only mode; the type check always
    /// applies. Any pending thunk is discarded.
    pub(crate) fn write(&self, attr: &Attribute, value: Value, force: bool) -> ObjectResult<()> {
        if !force && attr.spec.is_read_only() {
            return Err(ObjectError::read_only(self.class.name(), &attr.name));
        }
        if let Some(ty) = attr.spec.isa() {
            if !ty.accepts(&value) {
                return Err(ObjectError::type_mismatch(
                    &attr.name,
                    ty.to_string(),
                    value.type_name(),
                ));
            }
        }
        self.slots.borrow_mut()[attr.index] = Slot::Set(value);
        Ok(())
    }

    /// Clear a slot, including a pending thunk.
    pub(crate) fn clear(&self, attr: &Attribute) -> ObjectResult<()> {
        if attr.spec.is_required() {
            return Err(ObjectError::cannot_delete_required(self.class.name(), &attr.name));
        }
        let mut slots = self.slots.borrow_mut();
        if matches!(slots[attr.index], Slot::Unset) {
            return Err(ObjectError::not_set(self.class.name(), &attr.name));
        }
        slots[attr.index] = Slot::Unset;
        Ok(())
    }

    pub(crate) fn defer(&self, attr: &Attribute, thunk: Thunk) {
        self.slots.borrow_mut()[attr.index] = Slot::Pending(thunk);
    }

    pub(crate) fn evaluate(&self, thunk: &Thunk) -> ObjectResult<Value> {
        match thunk {
            Thunk::Value(value) => Ok(value.clone()),
            Thunk::Producer(producer) => producer(&self.handle()?),
            Thunk::Builder(method) => self.call(method, &[]),
        }
    }
}

impl Object for Instance {
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn isa(&self, type_name: &str) -> bool {
        self.class.isa(type_name)
    }

    fn does(&self, role: &str) -> bool {
        self.class.does(role)
    }

    fn get(&self, name: &str) -> ObjectResult<Value> {
        match self.class.member(name) {
            Some(Member::Attribute(index)) => self.read(self.attribute_at(*index)),
            Some(Member::Delegation(link)) => delegation::get(self, link),
            Some(Member::Method(_)) => Err(ObjectError::not_an_attribute(self.class.name(), name)),
            None => Err(ObjectError::no_such_member(self.class.name(), name)),
        }
    }

    fn set(&self, name: &str, value: Value) -> ObjectResult<()> {
        match self.class.member(name) {
            Some(Member::Attribute(index)) => self.write(self.attribute_at(*index), value, false),
            Some(Member::Delegation(link)) => delegation::set(self, link, value),
            Some(Member::Method(_)) => Err(ObjectError::not_an_attribute(self.class.name(), name)),
            None => Err(ObjectError::no_such_member(self.class.name(), name)),
        }
    }

    fn delete(&self, name: &str) -> ObjectResult<()> {
        match self.class.member(name) {
            Some(Member::Attribute(index)) => self.clear(self.attribute_at(*index)),
            Some(Member::Delegation(link)) => delegation::delete(self, link),
            Some(Member::Method(_)) => Err(ObjectError::not_an_attribute(self.class.name(), name)),
            None => Err(ObjectError::no_such_member(self.class.name(), name)),
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> ObjectResult<Value> {
        match self.class.member(name) {
            Some(Member::Method(method)) => method.invoke(&self.handle()?, args),
            Some(Member::Delegation(link)) => delegation::call(self, link, args),
            Some(Member::Attribute(_)) => Err(ObjectError::not_callable(self.class.name(), name)),
            None => Err(ObjectError::no_such_member(self.class.name(), name)),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are not printed: a delegation cycle would recurse.
        let set = self
            .class
            .attributes()
            .iter()
            .filter(|a| matches!(self.slots.borrow()[a.index], Slot::Set(_)))
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>();
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("set", &set)
            .finish()
    }
}
