use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::error::Error;
use crate::hash::hashtag;

/// Special tag value marking an empty slot.
///
/// Occupied tags are the top seven bits of the digest, so they never have
/// the sign bit set. Both special values do.
pub(crate) const EMPTY: u8 = 0x80;

/// Special tag value marking a slot vacated under tombstone deletion.
pub(crate) const TOMBSTONE: u8 = 0xFE;

#[inline(always)]
pub(crate) fn is_occupied(tag: u8) -> bool {
    tag & 0x80 == 0
}

#[derive(Debug, Clone, Copy)]
struct DataLayout {
    layout: Layout,
    digests_offset: usize,
    records_offset: usize,
}

impl DataLayout {
    fn new<T>(capacity: usize) -> Result<Self, Error> {
        let tags_layout = Layout::array::<u8>(capacity).map_err(|_| Error::CapacityOverflow)?;
        let digests_layout =
            Layout::array::<MaybeUninit<u64>>(capacity).map_err(|_| Error::CapacityOverflow)?;
        let records_layout =
            Layout::array::<MaybeUninit<T>>(capacity).map_err(|_| Error::CapacityOverflow)?;

        let (layout, digests_offset) = tags_layout
            .extend(digests_layout)
            .map_err(|_| Error::CapacityOverflow)?;
        let (layout, records_offset) = layout
            .extend(records_layout)
            .map_err(|_| Error::CapacityOverflow)?;

        Ok(DataLayout {
            layout,
            digests_offset,
            records_offset,
        })
    }
}

/// Contiguous, power-of-two sized slot storage.
///
/// One allocation holds three parallel regions: a tag byte per slot, the
/// cached digest per slot, and the record per slot. Digests and records are
/// only initialized where the tag is occupied. The array holds no policy;
/// every method that reads a digest or record requires the caller to know the
/// slot is occupied.
pub(crate) struct SlotArray<T> {
    layout: DataLayout,
    alloc: NonNull<u8>,
    capacity: usize,
    _phantom: PhantomData<T>,
}

// SAFETY: The array owns its records exactly like a `Box<[T]>` would.
unsafe impl<T: Send> Send for SlotArray<T> {}
// SAFETY: Shared access only hands out `&T`.
unsafe impl<T: Sync> Sync for SlotArray<T> {}

impl<T> SlotArray<T> {
    /// Allocates `capacity` empty slots.
    ///
    /// `capacity` must be a non-zero power of two.
    pub(crate) fn try_new(capacity: usize) -> Result<Self, Error> {
        debug_assert!(capacity.is_power_of_two());
        let layout = DataLayout::new::<T>(capacity)?;

        // SAFETY: The tags region is `capacity >= 1` bytes, so the layout is
        // never zero-sized. A null return is reported as an error instead of
        // being dereferenced.
        let alloc = unsafe {
            let raw_alloc = alloc::alloc::alloc(layout.layout);
            if raw_alloc.is_null() {
                return Err(Error::AllocationFailure {
                    layout: layout.layout,
                });
            }
            core::ptr::write_bytes(raw_alloc, EMPTY, capacity);
            NonNull::new_unchecked(raw_alloc)
        };

        Ok(Self {
            layout,
            alloc,
            capacity,
            _phantom: PhantomData,
        })
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub(crate) fn mask(&self) -> usize {
        self.capacity - 1
    }

    /// Total bytes held by the allocation.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn allocated_bytes(&self) -> usize {
        self.layout.layout.size()
    }

    #[inline(always)]
    pub(crate) fn tags(&self) -> &[u8] {
        // SAFETY: The tags region starts at offset 0, spans `capacity` bytes,
        // and is always initialized.
        unsafe { core::slice::from_raw_parts(self.alloc.as_ptr(), self.capacity) }
    }

    #[inline(always)]
    fn tags_mut(&mut self) -> &mut [u8] {
        // SAFETY: As in `tags`; `&mut self` guarantees exclusivity.
        unsafe { core::slice::from_raw_parts_mut(self.alloc.as_ptr(), self.capacity) }
    }

    #[inline(always)]
    fn digests_ptr(&self) -> *mut MaybeUninit<u64> {
        // SAFETY: The offset was computed for this allocation's layout.
        unsafe { self.alloc.as_ptr().add(self.layout.digests_offset).cast() }
    }

    #[inline(always)]
    fn records_ptr(&self) -> *mut MaybeUninit<T> {
        // SAFETY: The offset was computed for this allocation's layout.
        unsafe { self.alloc.as_ptr().add(self.layout.records_offset).cast() }
    }

    /// Splits the array into its tag and record regions for iteration.
    pub(crate) fn tags_and_records(&self) -> (&[u8], &[MaybeUninit<T>]) {
        // SAFETY: The records region spans `capacity` elements; `MaybeUninit`
        // makes viewing uninitialized entries sound.
        let records = unsafe { core::slice::from_raw_parts(self.records_ptr(), self.capacity) };
        (self.tags(), records)
    }

    /// Mutable variant of [`tags_and_records`](Self::tags_and_records). Tags
    /// stay shared so callers cannot break occupancy.
    pub(crate) fn tags_and_records_mut(&mut self) -> (&[u8], &mut [MaybeUninit<T>]) {
        // SAFETY: The tag and record regions do not overlap, and `&mut self`
        // guarantees nobody else observes either.
        unsafe {
            let tags = core::slice::from_raw_parts(self.alloc.as_ptr(), self.capacity);
            let records = core::slice::from_raw_parts_mut(self.records_ptr(), self.capacity);
            (tags, records)
        }
    }

    #[inline(always)]
    pub(crate) fn set_tag(&mut self, index: usize, tag: u8) {
        self.tags_mut()[index] = tag;
    }

    /// Reads the cached digest of an occupied slot.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be occupied.
    #[inline(always)]
    pub(crate) unsafe fn digest(&self, index: usize) -> u64 {
        debug_assert!(index < self.capacity && is_occupied(self.tags()[index]));
        // SAFETY: Caller ensures the slot is in bounds and occupied, so its
        // digest was written.
        unsafe { (*self.digests_ptr().add(index)).assume_init() }
    }

    /// Borrows the record of an occupied slot.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be occupied.
    #[inline(always)]
    pub(crate) unsafe fn record(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity && is_occupied(self.tags()[index]));
        // SAFETY: Caller ensures the slot is in bounds and occupied.
        unsafe { (*self.records_ptr().add(index)).assume_init_ref() }
    }

    /// Mutably borrows the record of an occupied slot.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be occupied.
    #[inline(always)]
    pub(crate) unsafe fn record_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity && is_occupied(self.tags()[index]));
        // SAFETY: Caller ensures the slot is in bounds and occupied.
        unsafe { (*self.records_ptr().add(index)).assume_init_mut() }
    }

    /// Writes a record into a vacant slot and tags it occupied.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must not be occupied, otherwise the
    /// resident record leaks.
    #[inline(always)]
    pub(crate) unsafe fn write(&mut self, index: usize, digest: u64, record: T) {
        debug_assert!(index < self.capacity && !is_occupied(self.tags()[index]));
        // SAFETY: Caller ensures the slot is in bounds.
        unsafe {
            self.digests_ptr().add(index).write(MaybeUninit::new(digest));
            self.records_ptr().add(index).write(MaybeUninit::new(record));
        }
        self.set_tag(index, hashtag(digest));
    }

    /// Moves the record out of an occupied slot and marks the slot `EMPTY`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be occupied.
    #[inline(always)]
    pub(crate) unsafe fn take(&mut self, index: usize) -> (u64, T) {
        // SAFETY: Caller ensures the slot is in bounds and occupied. The tag
        // is cleared right after so the record is never read twice.
        let taken = unsafe {
            (
                self.digest(index),
                (*self.records_ptr().add(index)).assume_init_read(),
            )
        };
        self.set_tag(index, EMPTY);
        taken
    }

    /// Exchanges an in-flight record with the resident of an occupied slot.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be occupied.
    #[inline(always)]
    pub(crate) unsafe fn swap(&mut self, index: usize, digest: &mut u64, record: &mut T) {
        debug_assert!(index < self.capacity && is_occupied(self.tags()[index]));
        let tag = hashtag(*digest);
        // SAFETY: Caller ensures the slot is in bounds and occupied, so both
        // the digest and the record are initialized.
        unsafe {
            core::mem::swap((*self.digests_ptr().add(index)).assume_init_mut(), digest);
            core::mem::swap((*self.records_ptr().add(index)).assume_init_mut(), record);
        }
        self.set_tag(index, tag);
    }

    /// Moves the record at `from` into the vacant slot `to`; `from` becomes
    /// `EMPTY`.
    ///
    /// # Safety
    ///
    /// Both indices must be in bounds and distinct, `from` occupied and `to`
    /// not occupied.
    #[inline(always)]
    pub(crate) unsafe fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(from != to);
        debug_assert!(is_occupied(self.tags()[from]) && !is_occupied(self.tags()[to]));
        // SAFETY: Caller ensures both slots are in bounds and distinct, so the
        // copies do not overlap.
        unsafe {
            core::ptr::copy_nonoverlapping(self.digests_ptr().add(from), self.digests_ptr().add(to), 1);
            core::ptr::copy_nonoverlapping(self.records_ptr().add(from), self.records_ptr().add(to), 1);
        }
        let tags = self.tags_mut();
        tags[to] = tags[from];
        tags[from] = EMPTY;
    }

    /// Drops every occupied record and marks all slots `EMPTY`.
    pub(crate) fn clear(&mut self) {
        if core::mem::needs_drop::<T>() {
            for index in 0..self.capacity {
                if is_occupied(self.tags()[index]) {
                    // SAFETY: The slot is occupied; its tag is reset below
                    // before anything can observe it again.
                    unsafe { (*self.records_ptr().add(index)).assume_init_drop() };
                }
            }
        }
        self.tags_mut().fill(EMPTY);
    }
}

impl<T> Drop for SlotArray<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: `alloc` came from `alloc::alloc::alloc` with this layout.
        unsafe { alloc::alloc::dealloc(self.alloc.as_ptr(), self.layout.layout) };
    }
}
