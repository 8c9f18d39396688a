//! Instance construction.
//!
//! Arguments are first normalized to keywords (through the class's
//! argument hook when it has one), then split into attribute values and
//! leftovers. Attributes are settled in four phases, each attribute by at
//! most one phase:
//!
//! 1. explicit constructor value
//! 2. default (deferred if lazy)
//! 3. builder (deferred if lazy)
//! 4. required check
//!
//! Within a phase, attributes are visited in slot order. Finally the build
//! hook runs with the leftover keywords. Any error abandons the instance.

use crate::instance::{Instance, Thunk};
use antler_core::{CallArgs, Keywords, ObjectError, ObjectRef, ObjectResult, Value};
use antler_registry::{Attribute, Class};
use std::rc::Rc;

/// Construct an instance of `class`.
pub fn construct(class: &Class, args: impl Into<CallArgs>) -> ObjectResult<Rc<Instance>> {
    let keywords = normalize(class, args.into())?;
    let (explicit, leftovers) = partition(class, keywords);

    if class.build_hook().is_none() {
        if let Some(name) = leftovers.keys().next() {
            return Err(ObjectError::unexpected_keyword(class.name(), name));
        }
    }

    let instance = Instance::allocate(class.clone());
    let mut settled = vec![false; class.attributes().len()];

    for (index, value) in explicit {
        instance.write(instance.attribute_at(index), value, true)?;
        settled[index] = true;
    }

    for attr in class.attributes() {
        if settled[attr.index] {
            continue;
        }
        if let Some(default) = attr.spec.default_value() {
            settle(&instance, attr, Thunk::from(default), "default")?;
            settled[attr.index] = true;
        }
    }

    for attr in class.attributes() {
        if settled[attr.index] {
            continue;
        }
        if let Some(builder) = attr.spec.builder_name() {
            settle(&instance, attr, Thunk::Builder(builder.to_string()), "builder")?;
            settled[attr.index] = true;
        }
    }

    for attr in class.attributes() {
        if !settled[attr.index] && attr.spec.is_required() {
            return Err(ObjectError::required_missing(class.name(), &attr.name));
        }
    }

    if let Some(hook) = class.build_hook() {
        let handle: ObjectRef = instance.clone();
        hook(&handle, leftovers)?;
    }

    tracing::trace!(class = %class.name(), "instance constructed");
    Ok(instance)
}

/// Construct an instance and return it as a generic object handle.
pub fn new_object(class: &Class, args: impl Into<CallArgs>) -> ObjectResult<ObjectRef> {
    let instance: ObjectRef = construct(class, args)?;
    Ok(instance)
}

fn normalize(class: &Class, args: CallArgs) -> ObjectResult<Keywords> {
    match class.build_args_hook() {
        Some(hook) => hook(class, args),
        None if !args.positional.is_empty() => Err(ObjectError::unexpected_positional(
            class.name(),
            args.positional.len(),
        )),
        None => Ok(args.keywords),
    }
}

/// Split keywords into `(slot, value)` pairs and everything else.
fn partition(class: &Class, keywords: Keywords) -> (Vec<(usize, Value)>, Keywords) {
    let mut explicit = Vec::new();
    let mut leftovers = Keywords::new();
    for (name, value) in keywords {
        match class.init_arg(&name) {
            Some(index) => explicit.push((index, value)),
            None => {
                leftovers.insert(name, value);
            }
        }
    }
    (explicit, leftovers)
}

/// Lazy attributes keep the thunk; eager ones evaluate it now.
fn settle(instance: &Instance, attr: &Attribute, thunk: Thunk, phase: &str) -> ObjectResult<()> {
    tracing::trace!(
        class = %instance.class().name(),
        attr = %attr.name,
        phase,
        lazy = attr.spec.is_lazy(),
        "settling attribute"
    );
    if attr.spec.is_lazy() {
        instance.defer(attr, thunk);
        return Ok(());
    }
    let value = instance.evaluate(&thunk)?;
    instance.write(attr, value, true)
}
