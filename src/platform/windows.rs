//! Win32 implementation: RegisterHotKey facade, message pump, window
//! enumeration.

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, EnumWindows, GetMessageW, GetShellWindow, GetWindowTextLengthW,
    GetWindowTextW, IsWindowVisible, TranslateMessage, MSG,
};

use super::RegistrationBackend;
use crate::hotkey::{HotkeyRegistry, RawMessage};
use crate::keys::{Modifiers, VirtualKey};

/// A top-level window handle, exposed as its raw value.
pub type WindowHandle = isize;

/// The real OS facade over RegisterHotKey/UnregisterHotKey.
///
/// Registrations are bound to the calling thread's message queue (no
/// window), so WM_HOTKEY arrives on the thread that registered - run
/// [`run_message_pump`] on that same thread.
pub struct WindowsBackend;

impl RegistrationBackend for WindowsBackend {
    fn register(&self, id: i32, modifiers: Modifiers, key: VirtualKey) -> Result<(), String> {
        unsafe { RegisterHotKey(None, id, HOT_KEY_MODIFIERS(modifiers.bits()), key.code()) }
            .map_err(|e| e.message())
    }

    fn unregister(&self, id: i32) -> Result<(), String> {
        unsafe { UnregisterHotKey(None, id) }.map_err(|e| e.message())
    }
}

/// Run a blocking message pump on the current thread, handing every
/// message to the registry before default processing. Returns when
/// WM_QUIT arrives.
pub fn run_message_pump(registry: &HotkeyRegistry) -> Result<(), String> {
    let mut msg = MSG::default();
    loop {
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match ret.0 {
            0 => return Ok(()), // WM_QUIT
            -1 => return Err(windows::core::Error::from_win32().message()),
            _ => {
                registry.dispatch(&RawMessage {
                    message: msg.message,
                    wparam: msg.wParam.0,
                    lparam: msg.lParam.0,
                    pt_x: msg.pt.x,
                    pt_y: msg.pt.y,
                    time: msg.time,
                });
                unsafe {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            }
        }
    }
}

/// Titles of all visible top-level windows, skipping the shell window
/// and untitled windows.
pub fn list_window_titles() -> Result<Vec<String>, String> {
    let mut titles: Vec<String> = Vec::new();
    unsafe {
        EnumWindows(
            Some(collect_titles_callback),
            LPARAM(&mut titles as *mut Vec<String> as isize),
        )
        .map_err(|e| e.message())?;
    }
    Ok(titles)
}

/// Find a visible top-level window by exact title. First match wins when
/// several windows share a title.
pub fn find_window_by_title(title: &str) -> Result<Option<WindowHandle>, String> {
    let mut search = FindWindow {
        target: title,
        found: None,
    };
    unsafe {
        EnumWindows(
            Some(find_window_callback),
            LPARAM(&mut search as *mut FindWindow as isize),
        )
        .map_err(|e| e.message())?;
    }
    Ok(search.found)
}

struct FindWindow<'a> {
    target: &'a str,
    found: Option<WindowHandle>,
}

unsafe extern "system" fn collect_titles_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let titles = &mut *(lparam.0 as *mut Vec<String>);
    if let Some(title) = window_title(hwnd) {
        titles.push(title);
    }
    TRUE
}

unsafe extern "system" fn find_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam.0 as *mut FindWindow);
    if search.found.is_none() {
        if let Some(title) = window_title(hwnd) {
            if title == search.target {
                search.found = Some(hwnd.0 as WindowHandle);
            }
        }
    }
    TRUE
}

fn window_title(hwnd: HWND) -> Option<String> {
    unsafe {
        if hwnd == GetShellWindow() || !IsWindowVisible(hwnd).as_bool() {
            return None;
        }
        let len = GetWindowTextLengthW(hwnd);
        if len == 0 {
            return None;
        }
        let mut buf = vec![0u16; len as usize + 1];
        let read = GetWindowTextW(hwnd, &mut buf);
        if read == 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..read as usize]))
    }
}
