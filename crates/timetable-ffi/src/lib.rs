//! C FFI bindings for timetable-core
//!
//! Exposes an opaque index handle to C/C++ hosts. Query results are
//! returned as JSON strings which the caller frees with `tt_free_string`.

use serde::Serialize;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;
use timetable_core::{ExtractConfig, IndexHandle, ScheduleEntry, Source, TimetableIndex};

/// Opaque handle to a loaded timetable
pub struct FfiIndex {
    inner: IndexHandle,
}

unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

fn json_string<T: Serialize + ?Sized>(value: &T) -> *mut c_char {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| CString::new(json).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

unsafe fn query(
    index: *const FfiIndex,
    name: *const c_char,
    run: impl Fn(&TimetableIndex, &str) -> Vec<ScheduleEntry>,
) -> *mut c_char {
    if index.is_null() {
        return ptr::null_mut();
    }
    let name = match str_arg(name) {
        Some(s) => s,
        None => return ptr::null_mut(),
    };

    let snapshot = (*index).inner.snapshot();
    json_string(&run(&snapshot, name))
}

/// Open a timetable from a workbook or slot CSV
///
/// # Safety
/// - `path` must be a valid C string
/// - Returns null if the source cannot be loaded
#[no_mangle]
pub unsafe extern "C" fn tt_index_open(path: *const c_char) -> *mut FfiIndex {
    let path = match str_arg(path) {
        Some(p) => PathBuf::from(p),
        None => return ptr::null_mut(),
    };

    let handle = IndexHandle::new(Source::File(path), ExtractConfig::default());
    if !handle.status().is_loaded() {
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(FfiIndex { inner: handle }))
}

/// Free an index
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open` or null
#[no_mangle]
pub unsafe extern "C" fn tt_index_free(index: *mut FfiIndex) {
    if !index.is_null() {
        drop(Box::from_raw(index));
    }
}

/// Reload the index if its source file changed since the last load
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
#[no_mangle]
pub unsafe extern "C" fn tt_index_refresh(index: *const FfiIndex) -> bool {
    if index.is_null() {
        return false;
    }
    (*index).inner.refresh()
}

/// Load status as JSON
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_status(index: *const FfiIndex) -> *mut c_char {
    if index.is_null() {
        return ptr::null_mut();
    }
    json_string(&(*index).inner.status())
}

/// Schedule of one teacher as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - `name` must be a valid C string
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_by_teacher(index: *const FfiIndex, name: *const c_char) -> *mut c_char {
    query(index, name, |idx, q| idx.by_teacher(q))
}

/// Classes of a section as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - `name` must be a valid C string
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_by_section(index: *const FfiIndex, name: *const c_char) -> *mut c_char {
    query(index, name, |idx, q| idx.by_section(q))
}

/// Classes held in a room as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - `name` must be a valid C string
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_by_room(index: *const FfiIndex, name: *const c_char) -> *mut c_char {
    query(index, name, |idx, q| idx.by_room(q))
}

/// Get the number of teachers in an index
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
#[no_mangle]
pub unsafe extern "C" fn tt_index_teacher_count(index: *const FfiIndex) -> usize {
    if index.is_null() {
        return 0;
    }
    (*index).inner.snapshot().teacher_count()
}

/// All teacher names, in display order, as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_teachers(index: *const FfiIndex) -> *mut c_char {
    if index.is_null() {
        return ptr::null_mut();
    }
    json_string(&(*index).inner.snapshot().all_teachers())
}

/// All section tokens as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_sections(index: *const FfiIndex) -> *mut c_char {
    if index.is_null() {
        return ptr::null_mut();
    }
    json_string((*index).inner.snapshot().all_sections())
}

/// All room names as a JSON array
///
/// # Safety
/// - `index` must be a valid pointer returned by `tt_index_open`
/// - Caller must free the returned string with `tt_free_string`
#[no_mangle]
pub unsafe extern "C" fn tt_index_rooms(index: *const FfiIndex) -> *mut c_char {
    if index.is_null() {
        return ptr::null_mut();
    }
    json_string((*index).inner.snapshot().all_rooms())
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a tt_* function or null
#[no_mangle]
pub unsafe extern "C" fn tt_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
