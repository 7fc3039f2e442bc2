//! The recursive descent grammar.
//!
//! One method per production. Every method consumes exactly the tokens of
//! its production and leaves the cursor on the first token after it; the
//! first token that fits no production aborts the parse with a syntax
//! error at that token.

use fbs_diagnostic::{ErrorKind, ErrorWithPos};
use fbs_ir::{
    BoolLit, Decl, EnumDecl, EnumValue, Field, FileDecl, FloatLit, Ident, Include, IntLit,
    Keyword, Metadata, MetadataEntry, NamespaceDecl, PosRange, QualIdent, RootDecl, RpcDecl,
    RpcMethod, Schema, SignedFloatLit, SignedIntLit, SpecialFloatLit, StrLit, Token, TokenKind,
    TypeDecl, TypeName, TypeRefNode, UintLit, UnionDecl, UnionValue, ValueNode,
};
use tracing::debug;

use crate::cursor::TokenCursor;

/// Parses one token stream into a [`Schema`].
#[derive(Debug)]
pub struct Parser {
    file: String,
    cursor: TokenCursor,
}

impl Parser {
    pub fn new(file: impl Into<String>, tokens: Vec<Token>) -> Parser {
        Parser {
            file: file.into(),
            cursor: TokenCursor::new(tokens),
        }
    }

    /// `schema := include* decl*`
    ///
    /// Stray top-level semicolons are skipped; includes must precede all
    /// declarations.
    pub fn parse(mut self) -> Result<Schema, ErrorWithPos> {
        debug!(file = %self.file, "parsing schema");
        let mut includes = Vec::new();
        while let Some(kw) = self.eat_keyword(Keyword::Include) {
            let name = self.expect_str()?;
            let semi = self.expect_punct(';')?;
            includes.push(Include {
                name,
                range: kw.range.merge(semi.range),
            });
        }
        let mut decls = Vec::new();
        loop {
            if matches!(self.cursor.peek().kind, TokenKind::Eof) {
                break;
            }
            if self.eat_punct(';').is_some() {
                continue;
            }
            let kw = match self.cursor.peek().kind {
                TokenKind::Keyword(kw) => kw,
                _ => return Err(self.syntax_error("declaration")),
            };
            let decl = match kw {
                Keyword::Namespace => Decl::Namespace(self.namespace_decl()?),
                Keyword::Table => Decl::Table(self.type_decl()?),
                Keyword::Struct => Decl::Struct(self.type_decl()?),
                Keyword::Enum => Decl::Enum(self.enum_decl()?),
                Keyword::Union => Decl::Union(self.union_decl()?),
                Keyword::RootType => Decl::Root(self.root_decl()?),
                Keyword::FileExtension => Decl::FileExtension(self.strlit_decl()?),
                Keyword::FileIdentifier => Decl::FileIdentifier(self.strlit_decl()?),
                Keyword::Attribute => Decl::Attribute(self.strlit_decl()?),
                Keyword::RpcService => Decl::Rpc(self.rpc_decl()?),
                _ => return Err(self.syntax_error("declaration")),
            };
            decls.push(decl);
        }
        debug!(
            includes = includes.len(),
            decls = decls.len(),
            "parsed schema"
        );
        Ok(Schema { includes, decls })
    }

    /// `namespace := 'namespace' qualident ';'`
    fn namespace_decl(&mut self) -> Result<NamespaceDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.qualident()?;
        let semi = self.expect_punct(';')?;
        Ok(NamespaceDecl {
            name,
            range: kw.range.merge(semi.range),
        })
    }

    /// `root := 'root_type' qualident ';'`
    fn root_decl(&mut self) -> Result<RootDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.qualident()?;
        let semi = self.expect_punct(';')?;
        Ok(RootDecl {
            name,
            range: kw.range.merge(semi.range),
        })
    }

    /// `file_extension`, `file_identifier` and `attribute` all take one
    /// string literal.
    fn strlit_decl(&mut self) -> Result<FileDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let value = self.expect_str()?;
        let semi = self.expect_punct(';')?;
        Ok(FileDecl {
            value,
            range: kw.range.merge(semi.range),
        })
    }

    /// `table`/`struct` declaration; the two productions are identical.
    fn type_decl(&mut self) -> Result<TypeDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.expect_ident()?;
        let metadata = self.metadata_opt()?;
        self.expect_punct('{')?;
        let mut fields = Vec::new();
        while !self.at_punct('}') {
            fields.push(self.field()?);
        }
        let close = self.expect_punct('}')?;
        Ok(TypeDecl {
            name,
            metadata,
            fields,
            range: kw.range.merge(close.range),
        })
    }

    /// `field := ident ':' typename ('=' value)? metadata? ';'`
    fn field(&mut self) -> Result<Field, ErrorWithPos> {
        let name = self.expect_ident()?;
        self.expect_punct(':')?;
        let ty = self.typename()?;
        let default = if self.eat_punct('=').is_some() {
            Some(self.value()?)
        } else {
            None
        };
        let metadata = self.metadata_opt()?;
        let semi = self.expect_punct(';')?;
        let range = name.range.merge(semi.range);
        Ok(Field {
            name,
            ty,
            default,
            metadata,
            range,
        })
    }

    /// `enum := 'enum' ident ':' typename metadata? '{' enumvals '}'`
    fn enum_decl(&mut self) -> Result<EnumDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.expect_ident()?;
        self.expect_punct(':')?;
        let base = self.typename()?;
        let metadata = self.metadata_opt()?;
        self.expect_punct('{')?;
        let mut values = Vec::new();
        if !self.at_punct('}') {
            loop {
                values.push(self.enum_value()?);
                if self.eat_punct(',').is_none() {
                    break;
                }
                if self.at_punct('}') {
                    break; // trailing comma
                }
            }
        }
        let close = self.expect_punct('}')?;
        Ok(EnumDecl {
            name,
            base,
            metadata,
            values,
            range: kw.range.merge(close.range),
        })
    }

    /// `enumval := ident ('=' intlit)?`
    fn enum_value(&mut self) -> Result<EnumValue, ErrorWithPos> {
        let name = self.expect_ident()?;
        let mut range = name.range;
        let value = if self.eat_punct('=').is_some() {
            let lit = self.int_lit()?;
            range = range.merge(lit.range());
            Some(lit)
        } else {
            None
        };
        Ok(EnumValue { name, value, range })
    }

    /// `union := 'union' ident metadata? '{' unionvals '}'`
    fn union_decl(&mut self) -> Result<UnionDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.expect_ident()?;
        let metadata = self.metadata_opt()?;
        self.expect_punct('{')?;
        let mut values = Vec::new();
        if !self.at_punct('}') {
            loop {
                values.push(self.union_value()?);
                if self.eat_punct(',').is_none() {
                    break;
                }
                if self.at_punct('}') {
                    break; // trailing comma
                }
            }
        }
        let close = self.expect_punct('}')?;
        Ok(UnionDecl {
            name,
            metadata,
            values,
            range: kw.range.merge(close.range),
        })
    }

    /// `unionval := (ident ':')? qualident`
    fn union_value(&mut self) -> Result<UnionValue, ErrorWithPos> {
        if self.at_punct('.') {
            let ty = self.qualident()?;
            let range = ty.range;
            return Ok(UnionValue {
                alias: None,
                ty,
                range,
            });
        }
        let first = self.expect_ident()?;
        if self.eat_punct(':').is_some() {
            let ty = self.qualident()?;
            let range = first.range.merge(ty.range);
            return Ok(UnionValue {
                alias: Some(first),
                ty,
                range,
            });
        }
        let ty = self.qualident_from(None, first)?;
        let range = ty.range;
        Ok(UnionValue {
            alias: None,
            ty,
            range,
        })
    }

    /// `rpc := 'rpc_service' ident '{' method* '}'`
    fn rpc_decl(&mut self) -> Result<RpcDecl, ErrorWithPos> {
        let kw = self.cursor.advance();
        let name = self.expect_ident()?;
        self.expect_punct('{')?;
        let mut methods = Vec::new();
        while !self.at_punct('}') {
            methods.push(self.rpc_method()?);
        }
        let close = self.expect_punct('}')?;
        Ok(RpcDecl {
            name,
            methods,
            range: kw.range.merge(close.range),
        })
    }

    /// `method := ident '(' qualident ')' ':' qualident metadata? ';'`
    fn rpc_method(&mut self) -> Result<RpcMethod, ErrorWithPos> {
        let name = self.expect_ident()?;
        self.expect_punct('(')?;
        let input = self.qualident()?;
        self.expect_punct(')')?;
        self.expect_punct(':')?;
        let output = self.qualident()?;
        let metadata = self.metadata_opt()?;
        let semi = self.expect_punct(';')?;
        let range = name.range.merge(semi.range);
        Ok(RpcMethod {
            name,
            input,
            output,
            metadata,
            range,
        })
    }

    /// `typename := '[' typeref ']' | typeref`
    fn typename(&mut self) -> Result<TypeName, ErrorWithPos> {
        if let Some(open) = self.eat_punct('[') {
            let ty = self.typeref()?;
            let close = self.expect_punct(']')?;
            return Ok(TypeName {
                vector: true,
                ty,
                range: open.range.merge(close.range),
            });
        }
        let ty = self.typeref()?;
        let range = ty.range();
        Ok(TypeName {
            vector: false,
            ty,
            range,
        })
    }

    /// `typeref := scalar-type-keyword | qualident`
    fn typeref(&mut self) -> Result<TypeRefNode, ErrorWithPos> {
        match self.cursor.peek().kind {
            TokenKind::Keyword(kw) if kw.is_scalar_type() => {
                let tok = self.cursor.advance();
                Ok(TypeRefNode::Scalar {
                    keyword: kw,
                    range: tok.range,
                })
            }
            TokenKind::Ident(_) | TokenKind::Punct('.') => Ok(TypeRefNode::Named(self.qualident()?)),
            _ => Err(self.syntax_error("type name")),
        }
    }

    /// `qualident := '.'? ident ('.' ident)*`
    fn qualident(&mut self) -> Result<QualIdent, ErrorWithPos> {
        let dot = self.eat_punct('.').map(|t| t.range);
        let first = self.expect_ident()?;
        self.qualident_from(dot, first)
    }

    fn qualident_from(
        &mut self,
        dot: Option<PosRange>,
        first: Ident,
    ) -> Result<QualIdent, ErrorWithPos> {
        let mut parts = vec![first];
        while self.eat_punct('.').is_some() {
            parts.push(self.expect_ident()?);
        }
        Ok(QualIdent::new(dot, parts))
    }

    /// `metadata := '(' (entry (',' entry)*)? ')'`, absent entirely when
    /// the next token is not `(`.
    fn metadata_opt(&mut self) -> Result<Option<Metadata>, ErrorWithPos> {
        let Some(open) = self.eat_punct('(') else {
            return Ok(None);
        };
        let mut entries = Vec::new();
        if !self.at_punct(')') {
            loop {
                entries.push(self.metadata_entry()?);
                if self.eat_punct(',').is_none() {
                    break;
                }
            }
        }
        let close = self.expect_punct(')')?;
        Ok(Some(Metadata {
            entries,
            range: open.range.merge(close.range),
        }))
    }

    /// `entry := ident (':' value)?`
    fn metadata_entry(&mut self) -> Result<MetadataEntry, ErrorWithPos> {
        let key = self.expect_ident()?;
        let mut range = key.range;
        let value = if self.eat_punct(':').is_some() {
            let v = self.value()?;
            range = range.merge(v.range());
            Some(v)
        } else {
            None
        };
        Ok(MetadataEntry { key, value, range })
    }

    /// Any literal or identifier acceptable as a default or metadata value.
    fn value(&mut self) -> Result<ValueNode, ErrorWithPos> {
        let kind = self.cursor.peek().kind.clone();
        match kind {
            TokenKind::Str(_) => Ok(ValueNode::Str(self.expect_str()?)),
            TokenKind::Int(v) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::Uint(UintLit {
                    value: v,
                    info: tok.info(),
                }))
            }
            TokenKind::Float(v) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::Float(FloatLit {
                    value: v,
                    info: tok.info(),
                }))
            }
            TokenKind::Keyword(Keyword::True | Keyword::False) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::Bool(BoolLit {
                    value: matches!(tok.kind, TokenKind::Keyword(Keyword::True)),
                    info: tok.info(),
                }))
            }
            TokenKind::Keyword(kw @ (Keyword::Inf | Keyword::Nan)) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::SpecialFloat(SpecialFloatLit {
                    value: special_float(kw),
                    info: tok.info(),
                }))
            }
            TokenKind::Punct('-' | '+') => self.signed_value(),
            TokenKind::Ident(_) | TokenKind::Punct('.') => {
                let mut q = self.qualident()?;
                if !q.leading_dot && q.parts.len() == 1 {
                    if let Some(first) = q.parts.pop() {
                        return Ok(ValueNode::Ident(first));
                    }
                }
                Ok(ValueNode::CompoundIdent(q))
            }
            _ => Err(self.syntax_error("value")),
        }
    }

    /// A `+` or `-` applied to an integer, float or special float.
    fn signed_value(&mut self) -> Result<ValueNode, ErrorWithPos> {
        let sign = self.cursor.advance();
        let negative = matches!(sign.kind, TokenKind::Punct('-'));
        match self.cursor.peek().kind {
            TokenKind::Int(value) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::SignedInt(SignedIntLit {
                    negative,
                    value,
                    range: sign.range.merge(tok.range),
                }))
            }
            TokenKind::Float(value) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::SignedFloat(SignedFloatLit {
                    negative,
                    value,
                    range: sign.range.merge(tok.range),
                }))
            }
            TokenKind::Keyword(kw @ (Keyword::Inf | Keyword::Nan)) => {
                let tok = self.cursor.advance();
                Ok(ValueNode::SignedFloat(SignedFloatLit {
                    negative,
                    value: special_float(kw),
                    range: sign.range.merge(tok.range),
                }))
            }
            _ => Err(self.syntax_error("numeric literal")),
        }
    }

    /// `intlit := ('-' | '+')? integer`, as enum values allow.
    fn int_lit(&mut self) -> Result<IntLit, ErrorWithPos> {
        if matches!(self.cursor.peek().kind, TokenKind::Punct('-' | '+')) {
            let sign = self.cursor.advance();
            let negative = matches!(sign.kind, TokenKind::Punct('-'));
            if let TokenKind::Int(value) = self.cursor.peek().kind {
                let tok = self.cursor.advance();
                return Ok(IntLit::Signed(SignedIntLit {
                    negative,
                    value,
                    range: sign.range.merge(tok.range),
                }));
            }
            return Err(self.syntax_error("integer literal"));
        }
        if let TokenKind::Int(value) = self.cursor.peek().kind {
            let tok = self.cursor.advance();
            return Ok(IntLit::Uint(UintLit {
                value,
                info: tok.info(),
            }));
        }
        Err(self.syntax_error("integer literal"))
    }

    fn at_punct(&self, c: char) -> bool {
        matches!(self.cursor.peek().kind, TokenKind::Punct(p) if p == c)
    }

    fn eat_punct(&mut self, c: char) -> Option<Token> {
        if self.at_punct(c) {
            Some(self.cursor.advance())
        } else {
            None
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<Token, ErrorWithPos> {
        self.eat_punct(c)
            .ok_or_else(|| self.syntax_error(format!("`{c}`")))
    }

    fn eat_keyword(&mut self, kw: Keyword) -> Option<Token> {
        if matches!(self.cursor.peek().kind, TokenKind::Keyword(k) if k == kw) {
            Some(self.cursor.advance())
        } else {
            None
        }
    }

    fn expect_ident(&mut self) -> Result<Ident, ErrorWithPos> {
        if matches!(self.cursor.peek().kind, TokenKind::Ident(_)) {
            let tok = self.cursor.advance();
            if let TokenKind::Ident(name) = tok.kind {
                return Ok(Ident {
                    name,
                    range: tok.range,
                });
            }
        }
        Err(self.syntax_error("identifier"))
    }

    fn expect_str(&mut self) -> Result<StrLit, ErrorWithPos> {
        if matches!(self.cursor.peek().kind, TokenKind::Str(_)) {
            let tok = self.cursor.advance();
            let info = tok.info();
            if let TokenKind::Str(value) = tok.kind {
                return Ok(StrLit { value, info });
            }
        }
        Err(self.syntax_error("string literal"))
    }

    fn syntax_error(&self, expected: impl Into<String>) -> ErrorWithPos {
        let found = self.cursor.peek();
        ErrorWithPos::new(
            self.file.clone(),
            found.range.start,
            ErrorKind::Syntax {
                expected: expected.into(),
                found: found.kind.to_string(),
            },
        )
    }
}

fn special_float(kw: Keyword) -> f64 {
    if kw == Keyword::Nan {
        f64::NAN
    } else {
        f64::INFINITY
    }
}
