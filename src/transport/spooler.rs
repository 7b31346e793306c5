//! # Windows Spooler Transport
//!
//! Submits each job to a named print queue with the `RAW` datatype, so the
//! ESC/POS bytes bypass the printer driver.
//!
//! ```text
//! OpenPrinterW → StartDocPrinterW → StartPagePrinter → WritePrinter
//!             → EndPagePrinter → EndDocPrinter → ClosePrinter
//! ```

use std::ffi::OsStr;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::ptr::null_mut;

use winapi::shared::minwindef::DWORD;
use winapi::shared::winerror::{ERROR_ACCESS_DENIED, ERROR_INVALID_PRINTER_NAME};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::winnt::{HANDLE, LPWSTR};
use winapi::um::winspool::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, StartDocPrinterW,
    StartPagePrinter, WritePrinter,
};

use super::Transport;
use crate::error::PrintError;

const DOC_NAME: &str = "rollprint receipt";

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

#[derive(Debug, Clone)]
pub struct Spooler {
    printer_name: String,
}

impl Spooler {
    pub fn new(printer_name: impl Into<String>) -> Self {
        Self {
            printer_name: printer_name.into(),
        }
    }

    fn last_error(&self, call: &str) -> PrintError {
        let code = unsafe { GetLastError() };
        match code {
            ERROR_INVALID_PRINTER_NAME => PrintError::DeviceNotFound(self.printer_name.clone()),
            ERROR_ACCESS_DENIED => PrintError::PermissionDenied(self.printer_name.clone()),
            _ => PrintError::Transport(format!(
                "{} failed for '{}': {}",
                call,
                self.printer_name,
                std::io::Error::from_raw_os_error(code as i32)
            )),
        }
    }
}

impl Transport for Spooler {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        let mut name = wide(&self.printer_name);
        let mut doc_name = wide(DOC_NAME);
        let mut datatype = wide("RAW");

        log::info!("spooling {} bytes to '{}'", data.len(), self.printer_name);

        unsafe {
            let mut handle: HANDLE = null_mut();
            if OpenPrinterW(name.as_mut_ptr() as LPWSTR, &mut handle, null_mut()) == 0 {
                return Err(self.last_error("OpenPrinterW"));
            }

            let mut doc_info = DOC_INFO_1W {
                pDocName: doc_name.as_mut_ptr(),
                pOutputFile: null_mut(),
                pDatatype: datatype.as_mut_ptr(),
            };
            if StartDocPrinterW(handle, 1, &mut doc_info as *mut _ as *mut u8) == 0 {
                let err = self.last_error("StartDocPrinterW");
                ClosePrinter(handle);
                return Err(err);
            }

            if StartPagePrinter(handle) == 0 {
                let err = self.last_error("StartPagePrinter");
                EndDocPrinter(handle);
                ClosePrinter(handle);
                return Err(err);
            }

            let mut written: DWORD = 0;
            let ok = WritePrinter(
                handle,
                data.as_ptr() as *mut _,
                data.len() as DWORD,
                &mut written,
            );
            let write_err = (ok == 0).then(|| self.last_error("WritePrinter"));

            EndPagePrinter(handle);
            EndDocPrinter(handle);
            ClosePrinter(handle);

            if let Some(err) = write_err {
                return Err(err);
            }
            if written as usize != data.len() {
                return Err(PrintError::Transport(format!(
                    "Partial write: wrote {} of {} bytes",
                    written,
                    data.len()
                )));
            }
        }

        Ok(())
    }
}
