use parking_lot::Mutex;

use crate::types::TypeId;
use crate::value::Value;

/// A live object of a registered type.
///
/// Holds one storage slot per flattened attribute. Slots are read and
/// written only through the installed access path; the lock is an
/// interior-mutability primitive, not a concurrency guarantee (setup and
/// access are serialized by the host).
pub struct Instance {
	ty: TypeId,
	slots: Mutex<Box<[Option<Value>]>>,
}

impl Instance {
	pub(crate) fn new(ty: TypeId, slot_count: usize) -> Self {
		Self {
			ty,
			slots: Mutex::new(vec![None; slot_count].into_boxed_slice()),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.ty
	}

	/// Runs `f` with exclusive access to one slot. Accessor logic executes
	/// inside this scope and must not re-enter the slot table.
	pub fn with_slot<R>(&self, slot: u32, f: impl FnOnce(&mut Option<Value>) -> R) -> R {
		let mut slots = self.slots.lock();
		f(&mut slots[slot as usize])
	}

	/// Raw slot read, bypassing any installed accessor. Debug/test aid.
	pub fn peek(&self, slot: u32) -> Option<Value> {
		self.slots.lock()[slot as usize].clone()
	}

	/// Raw slot write, bypassing any installed accessor. Debug/test aid.
	pub fn poke(&self, slot: u32, value: Value) {
		self.slots.lock()[slot as usize] = Some(value);
	}
}

impl std::fmt::Debug for Instance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Instance")
			.field("ty", &self.ty)
			.field("slots", &self.slots.lock().len())
			.finish()
	}
}
