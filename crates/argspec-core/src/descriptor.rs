use crate::values::ValueCell;
use rustc_hash::FxHashMap;
use std::marker::PhantomData;
use std::time::Duration;

/// Identifies one declared option or positional argument within its
/// [`DescriptorSet`]. Stable for the lifetime of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescKind {
    Option,
    Positional,
}

/// Configuration record for one declared option or positional argument.
///
/// Shape-immutable once registered: only the bound cell and `set_by_user`
/// mutate while a match run commits its bindings.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// The name as registered, e.g. `"f force"` or `"SRC"`.
    pub name: String,
    /// Matchable forms: dashed names for options, the bare name for
    /// positionals. Ordered as registered.
    pub names: Vec<String>,
    pub kind: DescKind,
    pub desc: String,
    pub env_var: Option<String>,
    pub hidden: bool,
    pub set_from_env: bool,
    pub set_by_user: bool,
    cell: ValueCell,
}

impl Descriptor {
    pub fn cell(&self) -> &ValueCell {
        &self.cell
    }

    /// The name used when this descriptor appears in an error message.
    pub fn label(&self) -> &str {
        &self.names[0]
    }

    pub fn is_default(&self) -> bool {
        self.cell.is_default()
    }
}

/// Typed read handle returned by the registration methods. Pass it back to
/// [`DescriptorSet::get`] after a match to read the bound value.
pub struct Handle<T> {
    id: DeclId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: DeclId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> DeclId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

/// Reads a typed value out of a [`ValueCell`]. Implemented for the eight
/// cell kinds; a handle's type parameter guarantees the kinds line up.
pub trait CellRead: Sized {
    fn read(cell: &ValueCell) -> Option<Self>;
}

macro_rules! impl_cell_read {
    ($ty:ty, $variant:ident, scalar) => {
        impl CellRead for $ty {
            fn read(cell: &ValueCell) -> Option<Self> {
                match cell {
                    ValueCell::$variant(c) => Some(c.value.clone()),
                    _ => None,
                }
            }
        }
    };
    ($ty:ty, $variant:ident, seq) => {
        impl CellRead for $ty {
            fn read(cell: &ValueCell) -> Option<Self> {
                match cell {
                    ValueCell::$variant(c) => Some(c.items.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_cell_read!(bool, Bool, scalar);
impl_cell_read!(String, Str, scalar);
impl_cell_read!(i64, Int, scalar);
impl_cell_read!(f64, Float, scalar);
impl_cell_read!(Duration, Duration, scalar);
impl_cell_read!(Vec<String>, Strs, seq);
impl_cell_read!(Vec<i64>, Ints, seq);
impl_cell_read!(Vec<f64>, Floats, seq);

/// Builder-style configuration for one option, mirroring the registration
/// surface of getopt-style libraries: a space-separated list of names
/// without the dashes (`"f force"` becomes `-f` and `--force`).
#[derive(Debug, Clone)]
pub struct Opt {
    pub name: String,
    pub desc: String,
    pub env_var: Option<String>,
    pub hidden: bool,
}

impl Opt {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            env_var: None,
            hidden: false,
        }
    }

    /// Space-separated environment variable names; the first one present in
    /// the environment seeds the value at registration time.
    pub fn env(mut self, vars: impl Into<String>) -> Self {
        self.env_var = Some(vars.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Builder-style configuration for one positional argument. The name must
/// be a valid all-caps identifier, e.g. `SRC` or `DST_FILE`.
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: String,
    pub desc: String,
    pub env_var: Option<String>,
    pub hidden: bool,
}

impl Arg {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            env_var: None,
            hidden: false,
        }
    }

    pub fn env(mut self, vars: impl Into<String>) -> Self {
        self.env_var = Some(vars.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Checks the all-caps identifier rule for positional names: an uppercase
/// ASCII letter followed by uppercase letters, digits or underscores.
pub fn is_plain_arg_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// The ordered, indexed collection of descriptors for one command.
///
/// Append-only during configuration; the matcher mutates cells and
/// `set_by_user` flags through it while committing a successful match.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descs: Vec<Descriptor>,
    opt_order: Vec<DeclId>,
    pos_order: Vec<DeclId>,
    opt_idx: FxHashMap<String, DeclId>,
    pos_idx: FxHashMap<String, DeclId>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn mk_opt(&mut self, opt: Opt, mut cell: ValueCell) -> DeclId {
        let names: Vec<String> = opt
            .name
            .split_whitespace()
            .map(|n| {
                if n.chars().count() > 1 {
                    format!("--{}", n)
                } else {
                    format!("-{}", n)
                }
            })
            .collect();
        if names.is_empty() {
            panic!("option registered with an empty name");
        }

        let set_from_env = match &opt.env_var {
            Some(vars) => cell.seed_from_env(vars),
            None => false,
        };

        let id = DeclId(self.descs.len());
        for name in &names {
            if self.opt_idx.contains_key(name) {
                panic!("duplicate option name {:?}", name);
            }
            self.opt_idx.insert(name.clone(), id);
        }

        self.descs.push(Descriptor {
            name: opt.name,
            names,
            kind: DescKind::Option,
            desc: opt.desc,
            env_var: opt.env_var,
            hidden: opt.hidden,
            set_from_env,
            set_by_user: false,
            cell,
        });
        self.opt_order.push(id);
        id
    }

    fn mk_arg(&mut self, arg: Arg, mut cell: ValueCell) -> DeclId {
        if !is_plain_arg_name(&arg.name) {
            panic!("invalid argument name {:?}: must be in all caps", arg.name);
        }
        if self.pos_idx.contains_key(&arg.name) {
            panic!("duplicate argument name {:?}", arg.name);
        }

        let set_from_env = match &arg.env_var {
            Some(vars) => cell.seed_from_env(vars),
            None => false,
        };

        let id = DeclId(self.descs.len());
        self.pos_idx.insert(arg.name.clone(), id);
        self.descs.push(Descriptor {
            name: arg.name.clone(),
            names: vec![arg.name.clone()],
            kind: DescKind::Positional,
            desc: arg.desc,
            env_var: arg.env_var,
            hidden: arg.hidden,
            set_from_env,
            set_by_user: false,
            cell,
        });
        self.pos_order.push(id);
        id
    }

    pub fn bool_opt(&mut self, opt: Opt, default: bool) -> Handle<bool> {
        Handle::new(self.mk_opt(opt, ValueCell::new_bool(default)))
    }

    pub fn string_opt(&mut self, opt: Opt, default: impl Into<String>) -> Handle<String> {
        Handle::new(self.mk_opt(opt, ValueCell::new_string(default)))
    }

    pub fn int_opt(&mut self, opt: Opt, default: i64) -> Handle<i64> {
        Handle::new(self.mk_opt(opt, ValueCell::new_int(default)))
    }

    pub fn float_opt(&mut self, opt: Opt, default: f64) -> Handle<f64> {
        Handle::new(self.mk_opt(opt, ValueCell::new_float(default)))
    }

    pub fn duration_opt(&mut self, opt: Opt, default: Duration) -> Handle<Duration> {
        Handle::new(self.mk_opt(opt, ValueCell::new_duration(default)))
    }

    pub fn strings_opt(&mut self, opt: Opt, default: Vec<String>) -> Handle<Vec<String>> {
        Handle::new(self.mk_opt(opt, ValueCell::new_strings(default)))
    }

    pub fn ints_opt(&mut self, opt: Opt, default: Vec<i64>) -> Handle<Vec<i64>> {
        Handle::new(self.mk_opt(opt, ValueCell::new_ints(default)))
    }

    pub fn floats_opt(&mut self, opt: Opt, default: Vec<f64>) -> Handle<Vec<f64>> {
        Handle::new(self.mk_opt(opt, ValueCell::new_floats(default)))
    }

    pub fn bool_arg(&mut self, arg: Arg, default: bool) -> Handle<bool> {
        Handle::new(self.mk_arg(arg, ValueCell::new_bool(default)))
    }

    pub fn string_arg(&mut self, arg: Arg, default: impl Into<String>) -> Handle<String> {
        Handle::new(self.mk_arg(arg, ValueCell::new_string(default)))
    }

    pub fn int_arg(&mut self, arg: Arg, default: i64) -> Handle<i64> {
        Handle::new(self.mk_arg(arg, ValueCell::new_int(default)))
    }

    pub fn float_arg(&mut self, arg: Arg, default: f64) -> Handle<f64> {
        Handle::new(self.mk_arg(arg, ValueCell::new_float(default)))
    }

    pub fn duration_arg(&mut self, arg: Arg, default: Duration) -> Handle<Duration> {
        Handle::new(self.mk_arg(arg, ValueCell::new_duration(default)))
    }

    pub fn strings_arg(&mut self, arg: Arg, default: Vec<String>) -> Handle<Vec<String>> {
        Handle::new(self.mk_arg(arg, ValueCell::new_strings(default)))
    }

    pub fn ints_arg(&mut self, arg: Arg, default: Vec<i64>) -> Handle<Vec<i64>> {
        Handle::new(self.mk_arg(arg, ValueCell::new_ints(default)))
    }

    pub fn floats_arg(&mut self, arg: Arg, default: Vec<f64>) -> Handle<Vec<f64>> {
        Handle::new(self.mk_arg(arg, ValueCell::new_floats(default)))
    }

    /// Reads the typed value currently held by a handle's cell.
    pub fn get<T: CellRead>(&self, handle: Handle<T>) -> T {
        match T::read(&self.descs[handle.id.0].cell) {
            Some(value) => value,
            // A handle is only ever constructed alongside its cell.
            None => unreachable!("descriptor cell kind mismatch"),
        }
    }

    pub fn descriptor(&self, id: DeclId) -> &Descriptor {
        &self.descs[id.0]
    }

    pub fn cell_mut(&mut self, id: DeclId) -> &mut ValueCell {
        &mut self.descs[id.0].cell
    }

    pub fn mark_set_by_user(&mut self, id: DeclId) {
        self.descs[id.0].set_by_user = true;
    }

    pub fn set_by_user<T>(&self, handle: Handle<T>) -> bool {
        self.descs[handle.id.0].set_by_user
    }

    pub fn is_default<T>(&self, handle: Handle<T>) -> bool {
        self.descs[handle.id.0].cell.is_default()
    }

    /// Declared options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &Descriptor> {
        self.opt_order.iter().map(|id| &self.descs[id.0])
    }

    /// Declared positionals in declaration order.
    pub fn positionals(&self) -> impl Iterator<Item = &Descriptor> {
        self.pos_order.iter().map(|id| &self.descs[id.0])
    }

    pub fn option_ids(&self) -> &[DeclId] {
        &self.opt_order
    }

    pub fn positional_ids(&self) -> &[DeclId] {
        &self.pos_order
    }

    pub fn lookup_option(&self, name: &str) -> Option<DeclId> {
        self.opt_idx.get(name).copied()
    }

    pub fn lookup_positional(&self, name: &str) -> Option<DeclId> {
        self.pos_idx.get(name).copied()
    }

    pub fn is_option_name(&self, token: &str) -> bool {
        self.opt_idx.contains_key(token)
    }

    pub fn has_options(&self) -> bool {
        !self.opt_order.is_empty()
    }
}
