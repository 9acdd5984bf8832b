//! Launching the consent page in a local browser

use std::io;

/// Opens a URL for the operator.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

impl<T: BrowserLauncher + ?Sized> BrowserLauncher for Box<T> {
    fn open(&self, url: &str) -> io::Result<()> {
        (**self).open(url)
    }
}

/// The operator's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

/// Never opens anything; the URL is only printed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

impl BrowserLauncher for NoBrowser {
    fn open(&self, _url: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "browser launch disabled",
        ))
    }
}
