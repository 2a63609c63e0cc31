//! Recursive-descent parser for colony and swarm descriptions.
//!
//! The top level is a single assignment, `name = ( … );`. When the name is
//! `pswarm` the body is parsed as a swarm, otherwise as a colony. Bodies
//! are parenthesized, comma-separated field lists:
//!
//! ```text
//! counterdown = (
//!     A = (a, b, e),
//!     e = e,
//!     f = f,
//!     n = 2,
//!     env = (b, b, e),
//!     B = (worker),
//!     worker = (
//!         { a, e },
//!         < a <-> b / a -> a, e -> a >
//!     )
//! );
//! ```
//!
//! Agent blocks must come after the `B` list that declares their names, and
//! colony blocks inside a swarm after the `C` list; a block for an
//! undeclared name is an error. The elementary object is inserted into
//! every environment that does not already hold it, so rules may always
//! count on `e` being present.

use log::debug;
use pcolsim_base::{Interner, Symbol};
use pcolsim_engine::{Agent, Multiset, Pcolony, Program, Pswarm, Rule, RuleBranch, RuleKind};

use crate::error::{ParseError, ParseErrorKind};
use crate::token::{Token, TokenKind};

pub type ParseResult<T> = Result<T, ParseError>;

/// A parsed top-level system: one colony or one swarm.
#[derive(Debug, Clone)]
pub enum ParsedSystem {
    Colony(Pcolony),
    Swarm(Pswarm),
}

/// Identifiers with structural meaning, interned once up front so field
/// dispatch is symbol comparison.
struct Keywords {
    pswarm: Symbol,
    alphabet: Symbol,
    e: Symbol,
    f: Symbol,
    n: Symbol,
    env: Symbol,
    agents: Symbol,
    colonies: Symbol,
    global_env: Symbol,
    in_global_env: Symbol,
    out_global_env: Symbol,
}

pub struct Parser<'int> {
    tokens: Vec<Token>,
    current: usize,
    interner: &'int mut Interner,
    kw: Keywords,
}

impl<'int> Parser<'int> {
    pub fn new(tokens: Vec<Token>, interner: &'int mut Interner) -> Self {
        let kw = Keywords {
            pswarm: interner.intern("pswarm"),
            alphabet: interner.intern("A"),
            e: interner.intern("e"),
            f: interner.intern("f"),
            n: interner.intern("n"),
            env: interner.intern("env"),
            agents: interner.intern("B"),
            colonies: interner.intern("C"),
            global_env: interner.intern("global_env"),
            in_global_env: interner.intern("in_global_env"),
            out_global_env: interner.intern("out_global_env"),
        };
        Parser {
            tokens,
            current: 0,
            interner,
            kw,
        }
    }

    /// Parses the whole token stream into a colony or a swarm.
    pub fn parse(mut self) -> ParseResult<ParsedSystem> {
        let name = self.expect_ident()?;
        self.consume(TokenKind::Assign)?;

        let system = if name == self.kw.pswarm {
            debug!("building a Pswarm");
            ParsedSystem::Swarm(self.parse_swarm()?)
        } else {
            debug!("building a Pcolony");
            ParsedSystem::Colony(self.parse_colony()?)
        };

        self.consume(TokenKind::End)?;
        self.consume(TokenKind::Eof)?;
        Ok(system)
    }

    // ------------------------------------------------------------------
    // Colony
    // ------------------------------------------------------------------

    fn parse_colony(&mut self) -> ParseResult<Pcolony> {
        let mut colony = Pcolony::new(self.kw.e, self.kw.f);

        self.consume(TokenKind::LParen)?;
        if !self.check(&TokenKind::RParen) {
            loop {
                self.parse_colony_field(&mut colony)?;
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen)?;

        // Environments always hold the elementary object.
        if !colony.env.contains(colony.e) {
            colony.env.insert(colony.e);
        }
        Ok(colony)
    }

    fn parse_colony_field(&mut self, colony: &mut Pcolony) -> ParseResult<()> {
        let key_span = self.current_span();
        let key = self.expect_ident()?;
        self.consume(TokenKind::Assign)?;

        if key == self.kw.alphabet {
            colony.alphabet = self.parse_paren_list()?;
        } else if key == self.kw.e {
            colony.e = self.expect_ident()?;
        } else if key == self.kw.f {
            colony.f = self.expect_ident()?;
        } else if key == self.kw.n {
            colony.capacity = self.expect_number()? as usize;
        } else if key == self.kw.env {
            colony.env = Multiset::from_symbols(self.parse_paren_list()?);
        } else if key == self.kw.agents {
            colony.agent_names = self.parse_paren_list()?;
        } else if colony.agent_names.contains(&key) {
            debug!("building agent {}", self.interner.resolve(key));
            let agent = self.parse_agent()?;
            colony.agents.insert(key, agent);
        } else {
            return Err(ParseError {
                kind: ParseErrorKind::UnknownAgent {
                    name: self.interner.resolve(key).to_string(),
                },
                span: key_span,
            });
        }
        Ok(())
    }

    fn parse_agent(&mut self) -> ParseResult<Agent> {
        self.consume(TokenKind::LParen)?;

        self.consume(TokenKind::LBrace)?;
        let objects = self.parse_id_list(&TokenKind::RBrace)?;
        self.consume(TokenKind::RBrace)?;
        let mut agent = Agent::new(Multiset::from_symbols(objects));

        while self.match_kind(&TokenKind::Comma) {
            agent.programs.push(self.parse_program()?);
        }

        self.consume(TokenKind::RParen)?;
        Ok(agent)
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        self.consume(TokenKind::Lt)?;
        let mut rules = vec![self.parse_rule()?];
        while self.match_kind(&TokenKind::Comma) {
            rules.push(self.parse_rule()?);
        }
        self.consume(TokenKind::Gt)?;
        Ok(Program::new(rules))
    }

    fn parse_rule(&mut self) -> ParseResult<Rule> {
        let first = self.parse_rule_branch()?;
        if self.match_kind(&TokenKind::Check) {
            let second = self.parse_rule_branch()?;
            Ok(Rule::Conditional { first, second })
        } else {
            Ok(Rule::Simple(first))
        }
    }

    fn parse_rule_branch(&mut self) -> ParseResult<RuleBranch> {
        let lhs = self.expect_ident()?;
        let op = self.advance();
        let kind = match op.kind {
            TokenKind::Evolution => RuleKind::Evolution,
            TokenKind::Communication => RuleKind::Communication,
            TokenKind::Exteroceptive => RuleKind::Exteroceptive,
            TokenKind::InExteroceptive => RuleKind::InExteroceptive,
            TokenKind::OutExteroceptive => RuleKind::OutExteroceptive,
            found => {
                return Err(ParseError {
                    kind: ParseErrorKind::ExpectedRuleOperator { found },
                    span: op.span,
                })
            }
        };
        let rhs = self.expect_ident()?;
        Ok(RuleBranch::new(kind, lhs, rhs))
    }

    // ------------------------------------------------------------------
    // Swarm
    // ------------------------------------------------------------------

    fn parse_swarm(&mut self) -> ParseResult<Pswarm> {
        let mut swarm = Pswarm::new();

        self.consume(TokenKind::LParen)?;
        if !self.check(&TokenKind::RParen) {
            loop {
                self.parse_swarm_field(&mut swarm)?;
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen)?;

        for env in [
            &mut swarm.envs.global_env,
            &mut swarm.envs.in_global_env,
            &mut swarm.envs.out_global_env,
        ] {
            if !env.contains(self.kw.e) {
                env.insert(self.kw.e);
            }
        }
        Ok(swarm)
    }

    fn parse_swarm_field(&mut self, swarm: &mut Pswarm) -> ParseResult<()> {
        let key_span = self.current_span();
        let key = self.expect_ident()?;
        self.consume(TokenKind::Assign)?;

        if key == self.kw.global_env {
            swarm.envs.global_env = Multiset::from_symbols(self.parse_paren_list()?);
        } else if key == self.kw.in_global_env {
            swarm.envs.in_global_env = Multiset::from_symbols(self.parse_paren_list()?);
        } else if key == self.kw.out_global_env {
            swarm.envs.out_global_env = Multiset::from_symbols(self.parse_paren_list()?);
        } else if key == self.kw.colonies {
            swarm.colony_names = self.parse_paren_list()?;
        } else if swarm.colony_names.contains(&key) {
            debug!("building colony {}", self.interner.resolve(key));
            let colony = self.parse_colony()?;
            swarm.colonies.insert(key, colony);
        } else {
            return Err(ParseError {
                kind: ParseErrorKind::UnknownColony {
                    name: self.interner.resolve(key).to_string(),
                },
                span: key_span,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// `( a, b, c )`, possibly empty.
    fn parse_paren_list(&mut self) -> ParseResult<Vec<Symbol>> {
        self.consume(TokenKind::LParen)?;
        let items = self.parse_id_list(&TokenKind::RParen)?;
        self.consume(TokenKind::RParen)?;
        Ok(items)
    }

    /// Comma-separated identifiers, stopping before `terminator`.
    fn parse_id_list(&mut self, terminator: &TokenKind) -> ParseResult<Vec<Symbol>> {
        let mut items = Vec::new();
        if self.check(terminator) {
            return Ok(items);
        }
        items.push(self.expect_ident()?);
        while self.match_kind(&TokenKind::Comma) {
            items.push(self.expect_ident()?);
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if self.is_at_end() {
            return self.peek();
        }
        self.current += 1;
        self.previous()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    /// Consumes the next token when it matches, look-behind style.
    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    expected: kind,
                    found: self.peek().kind,
                },
                span: self.current_span(),
            })
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Symbol> {
        let token = *self.advance();
        match token.kind {
            TokenKind::Ident(sym) => Ok(sym),
            found => Err(ParseError {
                kind: ParseErrorKind::ExpectedIdentifier { found },
                span: token.span,
            }),
        }
    }

    fn expect_number(&mut self) -> ParseResult<u64> {
        let token = *self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(value),
            found => Err(ParseError {
                kind: ParseErrorKind::ExpectedNumber { found },
                span: token.span,
            }),
        }
    }

    fn current_span(&self) -> pcolsim_base::Span {
        self.peek().span
    }
}
