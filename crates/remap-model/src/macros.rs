/// Declares an existing struct as a mappable record [`Shape`](crate::Shape).
///
/// Every field of the struct must be listed with its type. The plain form
/// requires `Default` and uses it as the shape's default instance; the
/// `@no_default` form declares a shape that cannot be constructed by the
/// compiler (it can still be a mapping source or an explicit mapper target).
///
/// ```
/// use remap_model::{Mappable, Shape, shape};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Address {
///     street: String,
///     zip: String,
/// }
///
/// shape!(Address { street: String, zip: String });
///
/// assert_eq!(Address::descriptor().fields().len(), 2);
/// assert!(Address::descriptor().is_constructible());
/// ```
#[macro_export]
macro_rules! shape {
    ($ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        $crate::shape!(@impl $ty { $($field : $fty),* });

        impl $crate::Shape for $ty {
            const NAME: &'static str = stringify!($ty);

            fn descriptor() -> $crate::ShapeDescriptor {
                $crate::ShapeDescriptor::new(stringify!($ty))
                    $(.field(stringify!($field), <$fty as $crate::Mappable>::value_type()))*
                    .constructible_with($crate::default_instance::<$ty>)
            }
        }
    };
    (@no_default $ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        $crate::shape!(@impl $ty { $($field : $fty),* });

        impl $crate::Shape for $ty {
            const NAME: &'static str = stringify!($ty);

            fn descriptor() -> $crate::ShapeDescriptor {
                $crate::ShapeDescriptor::new(stringify!($ty))
                    $(.field(stringify!($field), <$fty as $crate::Mappable>::value_type()))*
            }
        }
    };
    (@impl $ty:ident { $($field:ident : $fty:ty),* }) => {
        impl $crate::Mappable for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Record($crate::ShapeRef::of::<Self>())
            }

            #[allow(unused_mut)]
            fn to_value(&self) -> $crate::Value {
                let mut record = $crate::Record::new();
                $(record.insert(stringify!($field), $crate::Mappable::to_value(&self.$field));)*
                $crate::Value::Record(record)
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::ValueError> {
                let mut record = value.into_record(stringify!($ty))?;
                Ok(Self {
                    $($field: record.take_field::<$fty>(stringify!($ty), stringify!($field))?,)*
                })
            }
        }
    };
}

/// Declares a fieldless enum as [`Mappable`](crate::Mappable), lowering each
/// variant to [`Value::Enum`](crate::Value::Enum) with its name.
///
/// ```
/// use remap_model::{Mappable, Value, enum_shape};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status {
///     Active,
///     Suspended,
/// }
///
/// enum_shape!(Status { Active, Suspended });
///
/// assert_eq!(Status::Suspended.to_value(), Value::Enum("Suspended".to_string()));
/// ```
#[macro_export]
macro_rules! enum_shape {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::Mappable for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum($crate::TypeTag::of::<Self>(stringify!($ty)))
            }

            fn to_value(&self) -> $crate::Value {
                let name = match self {
                    $(Self::$variant => stringify!($variant),)+
                };
                $crate::Value::Enum(name.to_string())
            }

            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::ValueError> {
                match value {
                    $crate::Value::Enum(name) => {
                        $(if name == stringify!($variant) {
                            return Ok(Self::$variant);
                        })+
                        Err($crate::ValueError::UnknownVariant {
                            enum_name: stringify!($ty).to_string(),
                            variant: name,
                        })
                    }
                    other => Err($crate::ValueError::mismatch(stringify!($ty), other.kind())),
                }
            }
        }
    };
}
