use std::io::{BufRead, IsTerminal, Write};

use inquire::{InquireError, Password};
use relsync_core::{CredentialKind, CredentialProvider};
use secrecy::SecretString;

/// Asks the operator for each token. An empty answer means "none".
///
/// On a terminal the answer is read without echo; piped input is read as
/// one line.
pub struct PromptCredentials;

impl PromptCredentials {
    fn ask(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> std::io::Result<String> {
        write!(out, "{prompt}: ")?;
        out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }

    fn ask_hidden(prompt: &str) -> std::io::Result<String> {
        hidden_answer(Password::new(prompt).without_confirmation().prompt())
    }
}

fn hidden_answer(result: Result<String, InquireError>) -> std::io::Result<String> {
    match result {
        Ok(answer) => Ok(answer.trim().to_owned()),
        Err(InquireError::OperationCanceled) => Ok(String::new()),
        Err(InquireError::IO(e)) => Err(e),
        Err(e) => Err(std::io::Error::other(e)),
    }
}

impl CredentialProvider for PromptCredentials {
    fn secret(
        &self,
        kind: CredentialKind,
        account: Option<&str>,
    ) -> relsync_core::Result<Option<SecretString>> {
        let prompt = kind.token_label(account);
        let answer = if std::io::stdin().is_terminal() {
            Self::ask_hidden(&prompt)
        } else {
            Self::ask(&prompt, &mut std::io::stdin().lock(), &mut std::io::stderr())
        }
        .map_err(|e| relsync_core::Error::CredentialRead { kind, source: e })?;
        Ok((!answer.is_empty()).then(|| SecretString::from(answer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_is_trimmed() {
        let mut input = "  t0ken \n".as_bytes();
        let mut out = Vec::new();
        let answer = PromptCredentials::ask("host token for acme", &mut input, &mut out).unwrap();
        assert_eq!(answer, "t0ken");
        assert_eq!(out, b"host token for acme: ");
    }

    #[test]
    fn closed_input_is_empty_answer() {
        let mut input = "".as_bytes();
        let answer = PromptCredentials::ask("host token", &mut input, &mut Vec::new()).unwrap();
        assert!(answer.is_empty());
    }

    #[test]
    fn hidden_answer_is_trimmed() {
        assert_eq!(hidden_answer(Ok(" t0ken\n".to_owned())).unwrap(), "t0ken");
    }

    #[test]
    fn cancelled_hidden_prompt_is_no_answer() {
        let answer = hidden_answer(Err(InquireError::OperationCanceled)).unwrap();
        assert!(answer.is_empty());
    }

    #[test]
    fn interrupted_hidden_prompt_is_an_error() {
        assert!(hidden_answer(Err(InquireError::OperationInterrupted)).is_err());
        assert!(hidden_answer(Err(InquireError::NotTTY)).is_err());
    }
}
