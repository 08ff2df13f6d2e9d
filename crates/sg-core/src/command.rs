//! Scanner argument vector construction

/// Arguments every scan starts with, after the target pair
pub const SAFETY_FLAGS: &[&str] = &["--batch", "--disable-coloring"];

/// A fully assembled scanner invocation.
///
/// Held as discrete elements and executed without a shell, so metacharacters
/// in user tokens stay inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    program: String,
    args: Vec<String>,
}

impl ScanCommand {
    /// `program --target <url> --batch --disable-coloring <user tokens...>`
    pub fn build(program: &str, target_url: &str, user_tokens: Vec<String>) -> Self {
        let mut args = Vec::with_capacity(2 + SAFETY_FLAGS.len() + user_tokens.len());
        args.push("--target".to_string());
        args.push(target_url.to_string());
        args.extend(SAFETY_FLAGS.iter().map(|f| f.to_string()));
        args.extend(user_tokens);

        Self {
            program: program.to_string(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Complete argv including the program name
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}
