use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "'+'"),
            Self::Sub => write!(f, "'-'"),
            Self::Mul => write!(f, "'*'"),
            Self::Div => write!(f, "'/'"),
            Self::Mod => write!(f, "'%'"),
            Self::Pow => write!(f, "'**'"),
            Self::Eq => write!(f, "'=='"),
            Self::Ne => write!(f, "'!='"),
            Self::Lt => write!(f, "'<'"),
            Self::Le => write!(f, "'<='"),
            Self::Gt => write!(f, "'>'"),
            Self::Ge => write!(f, "'>='"),
        }
    }
}

/// Conversion functions callable from a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Int,
    Float,
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int()"),
            Self::Float => write!(f, "float()"),
        }
    }
}

impl Op {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// Binding strength used by the front end; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Pow => 3,
            Self::Mul | Self::Div | Self::Mod => 2,
            Self::Add | Self::Sub => 1,
            _ => 0,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        self == Self::Pow
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Real(f64),
    Str(String),
    Bool(bool),
    Ident(WithPos<String>),
    BinOp {
        lhs: Box<Self>,
        rhs: Box<Self>,
        op: WithPos<Op>,
    },
    Call {
        func: WithPos<Builtin>,
        arg: Box<Self>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(WithPos::new(name.into()))
    }

    pub fn binop(lhs: Expr, op: Op, rhs: Expr) -> Self {
        Expr::BinOp {
            lhs: lhs.into(),
            rhs: rhs.into(),
            op: WithPos::new(op),
        }
    }

    pub fn call(func: Builtin, arg: Expr) -> Self {
        Expr::Call {
            func: WithPos::new(func),
            arg: arg.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: WithPos<String>, val: Expr },
    Print(Option<Expr>),
    Expr(Expr),
}

impl Stmt {
    pub fn assign(name: impl Into<String>, val: Expr) -> Self {
        Stmt::Assign {
            name: WithPos::new(name.into()),
            val,
        }
    }
}

/// Ordered statements as handed over by a front end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program(pub Vec<WithPos<Stmt>>);

impl Program {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, stmt: Stmt) {
        let line = self.0.len() + 1;
        self.0.push(WithPos {
            pos: Pos(line, 1),
            inner: stmt,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WithPos<Stmt>> {
        self.0.iter()
    }
}

impl FromIterator<Stmt> for Program {
    fn from_iter<I: IntoIterator<Item = Stmt>>(iter: I) -> Self {
        let mut program = Program::new();
        for stmt in iter {
            program.push(stmt);
        }
        program
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos(pub usize, pub usize);

impl Pos {
    pub fn line(&self) -> usize {
        self.0
    }
}

impl From<(usize, usize)> for Pos {
    fn from(value: (usize, usize)) -> Self {
        Self(value.0, value.1)
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WithPos<T> {
    pub pos: Pos,
    pub inner: T,
}

impl<T> WithPos<T> {
    pub fn new(inner: T) -> Self {
        WithPos {
            pos: Pos::default(),
            inner,
        }
    }

    pub fn with_inner<P>(&self, inner: P) -> WithPos<P> {
        WithPos {
            pos: self.pos,
            inner,
        }
    }
}

impl<T> Deref for WithPos<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: PartialEq> PartialEq for WithPos<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}
