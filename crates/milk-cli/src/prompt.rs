use std::{
    io::{self, BufRead, BufReader, Stdin, Stdout, Write},
    sync::Mutex,
};

use async_trait::async_trait;
use milk_auth::Acknowledge;
use url::Url;

/// Prints the permission URL and waits for the operator to hit Enter.
pub struct LinePrompt<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl LinePrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }
}

#[async_trait]
impl<R, W> Acknowledge for LinePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    async fn acknowledge(&self, frob: &str, permission_url: &Url) -> io::Result<()> {
        {
            let mut out = self.output.lock().map_err(poisoned)?;
            writeln!(
                out,
                "We got frob {frob} from the API. Now open the URL {permission_url} to grant access."
            )?;
            write!(out, "Hit Enter to continue.")?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self.input.lock().map_err(poisoned)?.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before access was confirmed",
            ));
        }
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::other("prompt lock poisoned")
}
