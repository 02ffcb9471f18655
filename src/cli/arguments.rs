//! Turns parsed command-line flags into the [`Arguments`] the resolver works on.
//!
//! `-S`, `-L`, `-P`, `-F NAME -V VALUE` and positional words are taken in
//! command-line order, then `-g` is appended.  A bare positional word fills
//! `site`, `login`, or `password` depending on how many records exist at
//! that point; `NAME=VALUE` words add a field.

use clap::ArgMatches;

use crate::action::Arguments;
use crate::cli::Cli;
use crate::errors::{GpamError, Result};
use crate::password;
use crate::record::{Record, DEFAULT_DELIMITER};

/// Field names filled by bare positional words, in order.
const POSITIONAL_FIELDS: [&str; 3] = ["site", "login", "password"];

/// One record-producing value from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Named(&'static str, &'a str),
    Field(&'a str),
    Value(&'a str),
    Word(&'a str),
}

/// Build the per-invocation arguments from the CLI and the matches it was
/// parsed from.
pub fn build(cli: &Cli, matches: &ArgMatches) -> Result<Arguments> {
    let mut args = Arguments {
        interactive: cli.interactive,
        new: cli.new,
        update: cli.update,
        list: cli.list,
        delete: cli.delete,
        new_vault_name: cli.add_vault.clone(),
        new_default_vault_name: cli.set_default_vault.clone(),
        show_default_vault: cli.default_vault,
        new_master_key_value: cli.set_master_key.clone(),
        ..Arguments::new()
    };

    let mut pending_field: Option<&str> = None;
    for token in tokens_in_order(matches) {
        if let Some(name) = pending_field {
            if !matches!(token, Token::Value(_)) {
                return Err(GpamError::FieldValueNotSpecified(name.to_string()));
            }
        }

        match token {
            Token::Named(name, value) => args.records.add(Record::new(name, value)),
            Token::Field(name) => pending_field = Some(name),
            Token::Value(value) => {
                let name = pending_field
                    .take()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| GpamError::FieldNameNotSpecified(value.to_string()))?;
                args.records.add(Record::new(name, value));
            }
            Token::Word(word) => add_positional(&mut args, word)?,
        }
    }
    if let Some(name) = pending_field {
        return Err(GpamError::FieldValueNotSpecified(name.to_string()));
    }

    if let Some(length) = cli.generate {
        args.records.add(Record::new("password", password::generate(length)?));
    }

    Ok(args)
}

/// Every record-producing value, sorted by its position on the command line.
fn tokens_in_order(matches: &ArgMatches) -> Vec<Token<'_>> {
    let mut indexed = Vec::new();
    collect(matches, "site", |v| Token::Named("site", v), &mut indexed);
    collect(matches, "login", |v| Token::Named("login", v), &mut indexed);
    collect(matches, "password", |v| Token::Named("password", v), &mut indexed);
    collect(matches, "fields", Token::Field, &mut indexed);
    collect(matches, "values", Token::Value, &mut indexed);
    collect(matches, "args", Token::Word, &mut indexed);

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, token)| token).collect()
}

fn collect<'a>(
    matches: &'a ArgMatches,
    id: &str,
    token: impl Fn(&'a str) -> Token<'a>,
    out: &mut Vec<(usize, Token<'a>)>,
) {
    let (Some(indices), Some(values)) = (matches.indices_of(id), matches.get_many::<String>(id))
    else {
        return;
    };
    out.extend(indices.zip(values).map(|(index, value)| (index, token(value.as_str()))));
}

/// Handle one positional word: `NAME=VALUE` or a bare site/login/password.
fn add_positional(args: &mut Arguments, word: &str) -> Result<()> {
    let is_declaration = word.contains(DEFAULT_DELIMITER) && !word.starts_with(DEFAULT_DELIMITER);

    if is_declaration {
        let record = Record::parse(word, Some(DEFAULT_DELIMITER))
            .ok_or_else(|| GpamError::InvalidFieldDeclaration(word.to_string()))?;
        args.records.add(record);
        return Ok(());
    }

    match POSITIONAL_FIELDS.get(args.records.len()) {
        Some(name) => {
            args.records.add(Record::new(*name, word));
            Ok(())
        }
        None => Err(GpamError::InvalidFieldDeclaration(word.to_string())),
    }
}
