//! Dispatch axis macros
//!
//! Each macro matches one closed axis of the dispatch matrix and runs its body
//! with a type alias bound to the concrete Rust type, so nesting them
//! monomorphizes one code path per `(device, IdType, FloatType)` triple. The
//! runtime cost is one `match` per axis regardless of how many variants exist.
//!
//! ```ignore
//! dispatch_id_type!(graph.id_type(), I => {
//!     dispatch_float_type!(out.dtype(), F => {
//!         kernels.spmm_csc::<I, F>(&args)
//!     }, "SpMM")
//! })
//! ```
//!
//! Bodies must evaluate to `Result<_>`; unsupported values `return Err(..)`
//! from the enclosing function.

/// Internal helper macro to dispatch types requiring the "f16" feature.
/// Parameterized by type to avoid duplicating the macro for F16 vs BF16.
#[macro_export]
#[doc(hidden)]
macro_rules! dispatch_f16_type {
    ($T:ident, $body:block, $dtype:expr, $type:ty) => {{
        #[cfg(feature = "f16")]
        {
            type $T = $type;
            $body
        }
        #[cfg(not(feature = "f16"))]
        {
            return Err($crate::error::Error::FeatureRequired {
                dtype: $dtype,
                feature: "f16",
            });
        }
    }};
}

/// Bind `$I` to the Rust type of an [`IdType`](crate::dtype::IdType).
#[macro_export]
macro_rules! dispatch_id_type {
    ($id_type:expr, $I:ident => $body:block) => {
        match $id_type {
            $crate::dtype::IdType::I32 => {
                type $I = i32;
                $body
            }
            $crate::dtype::IdType::I64 => {
                type $I = i64;
                $body
            }
        }
    };
}

/// Bind `$F` to the Rust type of a float [`DType`](crate::dtype::DType).
///
/// Non-float dtypes fail with `UnsupportedDType` naming `$error_op`.
#[macro_export]
macro_rules! dispatch_float_type {
    ($dtype:expr, $F:ident => $body:block, $error_op:expr) => {
        match $crate::dtype::FloatType::from_dtype($dtype, $error_op)? {
            $crate::dtype::FloatType::F64 => {
                type $F = f64;
                $body
            }
            $crate::dtype::FloatType::F32 => {
                type $F = f32;
                $body
            }
            $crate::dtype::FloatType::F16 => {
                $crate::dispatch_f16_type!($F, $body, $dtype, half::f16)
            }
            $crate::dtype::FloatType::BF16 => {
                $crate::dispatch_f16_type!($F, $body, $dtype, half::bf16)
            }
        }
    };
}

/// Bind `$K` to the kernel backend serving a device context.
///
/// `$engine` must be an [`Engine`](crate::ops::Engine); the accelerator arm
/// fails with `UnsupportedDevice` unless the `cuda` feature is on and an
/// accelerator was installed.
#[macro_export]
macro_rules! dispatch_device {
    ($engine:expr, $ctx:expr, $op:expr, $K:ident => $body:block) => {
        match $ctx.device_type {
            $crate::runtime::DeviceType::Cpu => {
                let $K = $engine.cpu_kernels();
                $body
            }
            $crate::runtime::DeviceType::Cuda => {
                let $K = $engine.accelerator_kernels($ctx, $op)?;
                $body
            }
        }
    };
}
