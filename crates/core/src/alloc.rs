//! tree-sitter allocator override for `wasm32`.
//!
//! On `wasm32-unknown-unknown`, tree-sitter links a minimal libc shim whose malloc/free has been
//! seen to corrupt memory when trees are dropped from JS. We point tree-sitter at Rust's global
//! allocator instead. Every allocation carries a small header recording its size so that `free`
//! and `realloc` can rebuild the [`Layout`](std::alloc::Layout).
//!
//! On every other target this is a no-op.

#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_tree_sitter_allocator() {}

#[cfg(target_arch = "wasm32")]
pub fn ensure_tree_sitter_allocator() {
    use std::sync::Once;

    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        // SAFETY: tree-sitter documents this as unsafe because it mutates process globals. It runs
        // once, before any parser is created.
        unsafe {
            tree_sitter::set_allocator(
                Some(header::malloc),
                Some(header::calloc),
                Some(header::realloc),
                Some(header::free),
            );
        }
    });
}

#[cfg(target_arch = "wasm32")]
mod header {
    use core::ffi::c_void;
    use core::ptr;
    use std::alloc::{Layout, alloc, dealloc};

    const ALIGN: usize = 16;
    /// Header bytes in front of each user pointer. Kept at `ALIGN` so user pointers stay aligned.
    const HEADER: usize = ALIGN;

    fn layout_for(size: usize) -> Option<Layout> {
        let total = size.checked_add(HEADER)?;
        Layout::from_size_align(total, ALIGN).ok()
    }

    /// Recover the allocation base and the recorded user size from a user pointer.
    ///
    /// # Safety
    ///
    /// `user` must have been returned by [`malloc`] and not yet freed.
    unsafe fn base_and_size(user: *mut c_void) -> (*mut u8, usize) {
        let base = unsafe { (user as *mut u8).sub(HEADER) };
        let size = unsafe { (base as *const usize).read() };
        (base, size)
    }

    pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
        if size == 0 {
            return ptr::null_mut();
        }
        let Some(layout) = layout_for(size) else {
            return ptr::null_mut();
        };

        // SAFETY: layout has a non-zero size.
        let base = unsafe { alloc(layout) };
        if base.is_null() {
            return ptr::null_mut();
        }

        // SAFETY: base points to at least HEADER bytes, aligned for usize.
        unsafe {
            (base as *mut usize).write(size);
            base.add(HEADER) as *mut c_void
        }
    }

    pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
        let Some(total) = nmemb.checked_mul(size) else {
            return ptr::null_mut();
        };
        let user = unsafe { malloc(total) };
        if !user.is_null() {
            unsafe { ptr::write_bytes(user as *mut u8, 0, total) };
        }
        user
    }

    pub unsafe extern "C" fn free(user: *mut c_void) {
        if user.is_null() {
            return;
        }
        let (base, size) = unsafe { base_and_size(user) };
        if let Some(layout) = layout_for(size) {
            unsafe { dealloc(base, layout) };
        }
    }

    pub unsafe extern "C" fn realloc(user: *mut c_void, new_size: usize) -> *mut c_void {
        if user.is_null() {
            return unsafe { malloc(new_size) };
        }
        if new_size == 0 {
            unsafe { free(user) };
            return ptr::null_mut();
        }

        let (_, old_size) = unsafe { base_and_size(user) };
        let moved = unsafe { malloc(new_size) };
        if moved.is_null() {
            return ptr::null_mut();
        }

        unsafe {
            ptr::copy_nonoverlapping(
                user as *const u8,
                moved as *mut u8,
                old_size.min(new_size),
            );
            free(user);
        }
        moved
    }
}
