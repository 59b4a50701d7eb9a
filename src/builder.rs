use crate::error::{Error, Result};
use crate::{TagId, TagType, Tree, Value};

/// Fluent construction of a [`Tree`].
///
/// The builder keeps a cursor on the currently open collection, starting
/// at a fresh root compound. Named methods append to an open compound,
/// `elem_*` methods append to an open list; [`list`][Builder::list] and
/// [`compound`][Builder::compound] open a nested collection and move the
/// cursor into it, [`end`][Builder::end] moves back out.
///
/// Misuse (a wrong-typed list element, an element method while a compound
/// is open, `end` past the root) does not panic: the first error is
/// recorded, the rest of the chain becomes inert, and
/// [`finish`][Builder::finish] surfaces it.
///
/// ```
/// use tagtree::{Builder, TagType};
///
/// let tree = Builder::new("level")
///     .string("biome", "tundra")
///     .list("heights", TagType::Short)
///     .elem_short(312)
///     .elem_short(-4)
///     .end()
///     .compound("player")
///     .double("health", 19.5)
///     .end()
///     .finish()
///     .unwrap();
/// assert_eq!(tree.root().compound("player").unwrap().double("health").unwrap(), 19.5);
/// ```
pub struct Builder {
    tree: Tree,
    cursor: Option<TagId>,
    err: Option<Error>,
}

impl Builder {
    /// Start building at a fresh root compound named `name`.
    pub fn new(name: &str) -> Builder {
        let tree = Tree::new(name);
        let cursor = Some(tree.root_id());
        Builder {
            tree,
            cursor,
            err: None,
        }
    }

    /// Append a named tag of any kind to the open compound.
    pub fn value(mut self, name: &str, value: Value) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => {
                if let Err(e) = self.tree.put(c, name, value) {
                    self.err = Some(e);
                }
            }
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Append an unnamed tag of any kind to the open list.
    pub fn elem(mut self, value: Value) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => {
                if let Err(e) = self.tree.push(c, value) {
                    self.err = Some(e);
                }
            }
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    pub fn byte(self, name: &str, v: i8) -> Builder {
        self.value(name, Value::Byte(v))
    }

    pub fn short(self, name: &str, v: i16) -> Builder {
        self.value(name, Value::Short(v))
    }

    pub fn int(self, name: &str, v: i32) -> Builder {
        self.value(name, Value::Int(v))
    }

    pub fn long(self, name: &str, v: i64) -> Builder {
        self.value(name, Value::Long(v))
    }

    pub fn float(self, name: &str, v: f32) -> Builder {
        self.value(name, Value::Float(v))
    }

    pub fn double(self, name: &str, v: f64) -> Builder {
        self.value(name, Value::Double(v))
    }

    pub fn string(self, name: &str, v: &str) -> Builder {
        self.value(name, Value::String(v.to_owned()))
    }

    pub fn byte_array(self, name: &str, v: &[i8]) -> Builder {
        self.value(name, Value::ByteArray(v.to_vec()))
    }

    pub fn int_array(self, name: &str, v: &[i32]) -> Builder {
        self.value(name, Value::IntArray(v.to_vec()))
    }

    pub fn long_array(self, name: &str, v: &[i64]) -> Builder {
        self.value(name, Value::LongArray(v.to_vec()))
    }

    pub fn short_array(self, name: &str, v: &[i16]) -> Builder {
        self.value(name, Value::ShortArray(v.to_vec()))
    }

    pub fn float_array(self, name: &str, v: &[f32]) -> Builder {
        self.value(name, Value::FloatArray(v.to_vec()))
    }

    pub fn elem_byte(self, v: i8) -> Builder {
        self.elem(Value::Byte(v))
    }

    pub fn elem_short(self, v: i16) -> Builder {
        self.elem(Value::Short(v))
    }

    pub fn elem_int(self, v: i32) -> Builder {
        self.elem(Value::Int(v))
    }

    pub fn elem_long(self, v: i64) -> Builder {
        self.elem(Value::Long(v))
    }

    pub fn elem_float(self, v: f32) -> Builder {
        self.elem(Value::Float(v))
    }

    pub fn elem_double(self, v: f64) -> Builder {
        self.elem(Value::Double(v))
    }

    pub fn elem_string(self, v: &str) -> Builder {
        self.elem(Value::String(v.to_owned()))
    }

    pub fn elem_byte_array(self, v: &[i8]) -> Builder {
        self.elem(Value::ByteArray(v.to_vec()))
    }

    pub fn elem_int_array(self, v: &[i32]) -> Builder {
        self.elem(Value::IntArray(v.to_vec()))
    }

    pub fn elem_long_array(self, v: &[i64]) -> Builder {
        self.elem(Value::LongArray(v.to_vec()))
    }

    pub fn elem_short_array(self, v: &[i16]) -> Builder {
        self.elem(Value::ShortArray(v.to_vec()))
    }

    pub fn elem_float_array(self, v: &[f32]) -> Builder {
        self.elem(Value::FloatArray(v.to_vec()))
    }

    /// Open a named list of `element` tags inside the open compound and
    /// move the cursor into it.
    pub fn list(mut self, name: &str, element: TagType) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => match self.tree.put(c, name, Value::list(element)) {
                Ok(id) => self.cursor = Some(id),
                Err(e) => self.err = Some(e),
            },
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Open a named compound inside the open compound and move the cursor
    /// into it.
    pub fn compound(mut self, name: &str) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => match self.tree.put(c, name, Value::compound()) {
                Ok(id) => self.cursor = Some(id),
                Err(e) => self.err = Some(e),
            },
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Open an unnamed list of `element` tags as the next element of the
    /// open list and move the cursor into it.
    pub fn elem_list(mut self, element: TagType) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => match self.tree.push(c, Value::list(element)) {
                Ok(id) => self.cursor = Some(id),
                Err(e) => self.err = Some(e),
            },
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Open an unnamed compound as the next element of the open list and
    /// move the cursor into it.
    pub fn elem_compound(mut self) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => match self.tree.push(c, Value::compound()) {
                Ok(id) => self.cursor = Some(id),
                Err(e) => self.err = Some(e),
            },
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Close the open collection, moving the cursor back to its parent.
    /// Calling `end` more often than collections were opened is an error.
    pub fn end(mut self) -> Builder {
        if self.err.is_some() {
            return self;
        }
        match self.cursor {
            Some(c) => {
                self.cursor = self.tree.get(c).and_then(|r| r.parent()).map(|p| p.id());
            }
            None => self.err = Some(no_open_collection()),
        }
        self
    }

    /// Close everything still open and hand back the finished tree, or the
    /// first error the chain hit.
    pub fn finish(self) -> Result<Tree> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(self.tree),
        }
    }
}

fn no_open_collection() -> Error {
    Error::Validation("no open collection".to_owned())
}
