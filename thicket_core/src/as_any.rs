use std::any::Any;

/// Access to [`Any`] for trait objects, so actions and configs can be
/// downcast back to their concrete type.
///
/// The blanket implementation below is the only one needed, trait objects
/// pick it up through their supertrait.
pub trait AsAny {
    fn as_any_ref(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T> AsAny for T
where
    T: Any,
{
    fn as_any_ref(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Shorthand to avoid `.as_any_ref().downcast_ref()` chains.
pub trait AsAnyHelper: AsAny {
    fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any_ref().downcast_ref()
    }
    fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}
impl<T: AsAny + ?Sized> AsAnyHelper for T {}
